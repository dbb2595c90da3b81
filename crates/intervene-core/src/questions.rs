//! Predefined follow-up questions offered on a message that names
//! substations.

/// Questions asked of each substation after a disturbance.
pub const QUESTIONS: [&str; 2] = [
  "Poderias enviar as proteções que atuaram?",
  "Poderias enviar o índice de chuva?",
];

/// One question per (substation, question) pair, substation-major.
pub fn predefined_questions(substations: &[String]) -> Vec<String> {
  substations
    .iter()
    .flat_map(|s| QUESTIONS.iter().map(move |q| format!("{s} : {q}")))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cross_product_in_substation_order() {
    let out = predefined_questions(&["SE1".into(), "SE2".into()]);
    assert_eq!(out, [
      "SE1 : Poderias enviar as proteções que atuaram?",
      "SE1 : Poderias enviar o índice de chuva?",
      "SE2 : Poderias enviar as proteções que atuaram?",
      "SE2 : Poderias enviar o índice de chuva?",
    ]);
  }

  #[test]
  fn no_substations_no_questions() {
    assert!(predefined_questions(&[]).is_empty());
  }
}
