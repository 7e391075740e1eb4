use proptest::prelude::*;
use risk_aggregator::types::AnalysisResult;
use risk_aggregator::CallSession;

fn utterance() -> impl Strategy<Value = AnalysisResult> {
  (0.0f64..=1.0, any::<bool>()).prop_map(|(score, is_phishing)| AnalysisResult {
    sentence: "utterance".into(),
    score,
    is_phishing,
  })
}

fn expected(all: &[AnalysisResult]) -> u8 {
  all
    .iter()
    .filter(|r| r.is_phishing)
    .map(|r| r.score * 100.0)
    .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |m| m.max(p))))
    .map(|m| m.round() as u8)
    .unwrap_or(0)
}

proptest! {
  #[test]
  fn voice_risk_is_max_of_flagged_regardless_of_batching(
    all in prop::collection::vec(utterance(), 0..40),
    cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
  ) {
    let mut bounds: Vec<usize> = cuts.iter().map(|c| c.index(all.len() + 1)).collect();
    bounds.push(0);
    bounds.push(all.len());
    bounds.sort_unstable();

    let mut session = CallSession::new("p");
    let mut last = 0;
    for w in bounds.windows(2) {
      last = session.ingest_phishing_batch(&all[w[0]..w[1]]);
    }
    prop_assert_eq!(last, expected(&all));
    prop_assert_eq!(session.phishing_scores().len(), all.len());
  }

  #[test]
  fn voice_risk_ignores_arrival_order(
    mut all in prop::collection::vec(utterance(), 0..40),
  ) {
    let mut forward = CallSession::new("p");
    forward.ingest_phishing_batch(&all);
    all.reverse();
    let mut backward = CallSession::new("p");
    backward.ingest_phishing_batch(&all);
    prop_assert_eq!(forward.voice_risk_percent(), backward.voice_risk_percent());
  }

  #[test]
  fn voice_risk_never_decreases(
    batches in prop::collection::vec(prop::collection::vec(utterance(), 0..8), 1..8),
  ) {
    let mut session = CallSession::new("p");
    let mut prev = 0;
    for batch in &batches {
      let now = session.ingest_phishing_batch(batch);
      prop_assert!(now >= prev);
      prev = now;
    }
  }
}
