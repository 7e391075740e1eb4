//! Core engine: owns the call store, risk numbers and per-call sessions.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::call_store::CallStore;
use crate::category;
use crate::config::Config;
use crate::error::AggregatorError;
use crate::normalize;
use crate::risk_numbers::RiskNumberSet;
use crate::sections;
use crate::session::CallSession;
use crate::types::*;

/// Application state for one user. Holds everything in memory.
pub struct Engine {
  config: Config,
  calls: CallStore,
  risk_numbers: RiskNumberSet,
  sessions: HashMap<String, CallSession>,
}

impl Engine {
  pub fn new(config: Config, calls: CallStore) -> Self {
    Self {
      config,
      calls,
      risk_numbers: RiskNumberSet::new(),
      sessions: HashMap::new(),
    }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default(), CallStore::new())
  }

  pub fn with_samples() -> Self {
    Self::new(Config::default(), CallStore::with_samples())
  }

  /// Parse one JSON command line and run it.
  pub fn process_line(&mut self, line: &str) -> Result<Output, AggregatorError> {
    let cmd: Command = serde_json::from_str(line)?;
    self.process(&cmd)
  }

  /// Run one command and return its result.
  pub fn process(&mut self, cmd: &Command) -> Result<Output, AggregatorError> {
    match cmd {
      Command::AddCall { call } => Ok(Output::Call {
        call: self.add_call(call)?,
      }),
      Command::ListCalls => Ok(Output::Sections {
        sections: self.sections(),
      }),
      Command::Deepfake { call_id, response } => Ok(Output::Session {
        session: self.apply_deepfake(call_id, response)?,
      }),
      Command::Phishing { call_id, response } => Ok(Output::Session {
        session: self.apply_phishing(call_id, response)?,
      }),
      Command::Analyze {
        call_id,
        deepfake,
        phishing,
      } => Ok(Output::Session {
        session: self.apply_analysis(call_id, deepfake.as_ref(), phishing)?,
      }),
      Command::ResetDeepfake { call_id } => Ok(Output::Session {
        session: self.reset_deepfake(call_id)?,
      }),
      Command::Decide { call_id } => Ok(Output::Category {
        call_id: call_id.clone(),
        category: self.decide(call_id)?,
      }),
      Command::Session { call_id } => Ok(Output::Session {
        session: self.session(call_id)?,
      }),
      Command::AddRiskNumber { number } => {
        self.add_risk_number(number);
        Ok(Output::RiskNumbers {
          numbers: self.risk_numbers.to_vec(),
        })
      }
      Command::RemoveRiskNumber { number } => {
        self.remove_risk_number(number);
        Ok(Output::RiskNumbers {
          numbers: self.risk_numbers.to_vec(),
        })
      }
      Command::ListRiskNumbers => Ok(Output::RiskNumbers {
        numbers: self.risk_numbers.to_vec(),
      }),
    }
  }

  // -------------------------------------------------------------------------
  // Calls
  // -------------------------------------------------------------------------

  pub fn add_call(&mut self, new: &NewCall) -> Result<CallRecord, AggregatorError> {
    let record = self.calls.add(new)?;
    info!(call_id = %record.id, name = %record.name, "call added");
    Ok(record)
  }

  pub fn call(&self, call_id: &str) -> Result<CallDetail, AggregatorError> {
    let call = self
      .calls
      .get(call_id)
      .cloned()
      .ok_or_else(|| AggregatorError::UnknownCall(call_id.to_string()))?;
    let session = self
      .sessions
      .get(call_id)
      .map(|s| s.snapshot(call.category));
    Ok(CallDetail { call, session })
  }

  pub fn sections(&self) -> Vec<Section> {
    sections::group_by_day(self.calls.iter())
  }

  // -------------------------------------------------------------------------
  // Analysis
  // -------------------------------------------------------------------------

  /// Validate and apply a deepfake verdict. Does not re-decide the category.
  pub fn apply_deepfake(
    &mut self,
    call_id: &str,
    raw: &DeepfakeResponse,
  ) -> Result<SessionSnapshot, AggregatorError> {
    self.ensure_call(call_id)?;
    let result = normalize::deepfake(raw)?;

    let session = self.session_mut(call_id);
    let percent = session.ingest_deepfake(&result);
    info!(call_id, deepfake_percent = percent, label = %result.label, "deepfake score applied");

    self.session(call_id)
  }

  /// Validate and apply a phishing batch, then re-decide the call category.
  pub fn apply_phishing(
    &mut self,
    call_id: &str,
    raw: &PhishingResponse,
  ) -> Result<SessionSnapshot, AggregatorError> {
    self.ensure_call(call_id)?;
    let batch = normalize::phishing(raw)?;

    let session = self.session_mut(call_id);
    let voice = session.ingest_phishing_batch(&batch);
    info!(call_id, utterances = batch.len(), voice_risk_percent = voice, "phishing batch applied");

    self.decide(call_id)?;
    self.session(call_id)
  }

  /// Apply the results of one uploaded recording as a unit.
  ///
  /// Both responses are validated before anything is written. With no deepfake
  /// response the deepfake reading is reset to 0 before the batch is applied.
  pub fn apply_analysis(
    &mut self,
    call_id: &str,
    deepfake: Option<&DeepfakeResponse>,
    phishing: &PhishingResponse,
  ) -> Result<SessionSnapshot, AggregatorError> {
    self.ensure_call(call_id)?;
    let verdict = deepfake.map(normalize::deepfake).transpose()?;
    let batch = normalize::phishing(phishing)?;

    let session = self.session_mut(call_id);
    match &verdict {
      Some(result) => {
        session.ingest_deepfake(result);
      }
      None => session.reset_deepfake(),
    }
    let voice = session.ingest_phishing_batch(&batch);
    let deep = session.deepfake_percent();
    info!(
      call_id,
      utterances = batch.len(),
      voice_risk_percent = voice,
      deepfake_percent = deep,
      "analysis applied"
    );

    self.decide(call_id)?;
    self.session(call_id)
  }

  pub fn reset_deepfake(&mut self, call_id: &str) -> Result<SessionSnapshot, AggregatorError> {
    self.ensure_call(call_id)?;
    self.session_mut(call_id).reset_deepfake();
    debug!(call_id, "deepfake score reset");
    self.session(call_id)
  }

  /// Decide the category from the session's current aggregates and store it.
  pub fn decide(&mut self, call_id: &str) -> Result<CallCategory, AggregatorError> {
    self.ensure_call(call_id)?;
    let (voice, deep) = {
      let session = self.session_mut(call_id);
      (session.voice_risk_percent(), session.deepfake_percent())
    };
    let decided = category::decide(voice, deep, &self.config);
    self.calls.update_category(call_id, decided)?;
    info!(call_id, voice_risk_percent = voice, deepfake_percent = deep, category = ?decided, "category decided");
    Ok(decided)
  }

  /// Snapshot of a call's session. Calls never analysed get an empty session view.
  pub fn session(&self, call_id: &str) -> Result<SessionSnapshot, AggregatorError> {
    let call = self
      .calls
      .get(call_id)
      .ok_or_else(|| AggregatorError::UnknownCall(call_id.to_string()))?;
    Ok(match self.sessions.get(call_id) {
      Some(session) => session.snapshot(call.category),
      None => CallSession::new(call_id).snapshot(call.category),
    })
  }

  // -------------------------------------------------------------------------
  // Risk numbers
  // -------------------------------------------------------------------------

  pub fn add_risk_number(&mut self, raw: &str) -> &RiskNumberSet {
    if self.risk_numbers.add(raw) {
      info!(number = %raw.trim(), "risk number added");
    }
    &self.risk_numbers
  }

  pub fn remove_risk_number(&mut self, number: &str) -> &RiskNumberSet {
    let removed = self.risk_numbers.remove(number);
    if removed > 0 {
      info!(number, removed, "risk number removed");
    }
    &self.risk_numbers
  }

  pub fn risk_numbers(&self) -> &RiskNumberSet {
    &self.risk_numbers
  }

  fn ensure_call(&self, call_id: &str) -> Result<(), AggregatorError> {
    match self.calls.get(call_id) {
      Some(_) => Ok(()),
      None => Err(AggregatorError::UnknownCall(call_id.to_string())),
    }
  }

  fn session_mut(&mut self, call_id: &str) -> &mut CallSession {
    self
      .sessions
      .entry(call_id.to_string())
      .or_insert_with(|| CallSession::new(call_id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn phishing(items: &[(&str, f64, bool)]) -> PhishingResponse {
    PhishingResponse {
      results: items
        .iter()
        .map(|(sentence, score, is_phishing)| PhishingItem {
          sentence: (*sentence).into(),
          score: *score,
          is_phishing: *is_phishing,
        })
        .collect(),
    }
  }

  fn deepfake(probability: &str) -> DeepfakeResponse {
    DeepfakeResponse {
      result: "bonafide".into(),
      probability: Probability::Text(probability.into()),
      filename: "call.wav".into(),
    }
  }

  #[test]
  fn phishing_batch_decides_category() {
    let mut engine = Engine::with_samples();
    let snap = engine
      .apply_phishing("3", &phishing(&[("대출 상품 안내드립니다", 0.82, true)]))
      .unwrap();
    assert_eq!(snap.voice_risk.percent, 82);
    assert_eq!(snap.category, CallCategory::PhishingSuspected);
    assert_eq!(
      engine.call("3").unwrap().call.category,
      CallCategory::PhishingSuspected
    );
  }

  #[test]
  fn deepfake_then_safe_phishing_gives_deepfake_category() {
    let mut engine = Engine::with_samples();
    engine.apply_deepfake("3", &deepfake("0.91")).unwrap();
    // Deepfake alone does not decide.
    assert_eq!(engine.call("3").unwrap().call.category, CallCategory::NoContent);
    let snap = engine
      .apply_phishing("3", &phishing(&[("안녕하세요", 0.05, false)]))
      .unwrap();
    assert_eq!(snap.category, CallCategory::DeepfakeSuspected);
    assert_eq!(snap.deepfake.percent, 91);
    assert_eq!(snap.deepfake_label.as_deref(), Some("bonafide"));
  }

  #[test]
  fn reset_deepfake_before_phishing_only_analysis() {
    let mut engine = Engine::with_samples();
    engine.apply_deepfake("3", &deepfake("0.91")).unwrap();
    engine.reset_deepfake("3").unwrap();
    let snap = engine
      .apply_phishing("3", &phishing(&[("안녕하세요", 0.05, false)]))
      .unwrap();
    assert_eq!(snap.category, CallCategory::Safe);
  }

  #[test]
  fn analysis_applies_deepfake_and_batch_together() {
    let mut engine = Engine::with_samples();
    let snap = engine
      .apply_analysis(
        "3",
        Some(&deepfake("0.9")),
        &phishing(&[("안녕하세요", 0.2, false), ("계좌 이체 부탁드립니다", 0.6, true)]),
      )
      .unwrap();
    assert_eq!(snap.deepfake.percent, 90);
    assert_eq!(snap.voice_risk.percent, 60);
    assert_eq!(snap.category, CallCategory::PhishingSuspected);
  }

  #[test]
  fn phishing_only_analysis_resets_deepfake() {
    let mut engine = Engine::with_samples();
    engine.apply_deepfake("3", &deepfake("0.9")).unwrap();
    let snap = engine
      .apply_analysis("3", None, &phishing(&[("안녕하세요", 0.1, false)]))
      .unwrap();
    assert_eq!(snap.deepfake.percent, 0);
    assert_eq!(snap.category, CallCategory::Safe);
  }

  #[test]
  fn invalid_batch_keeps_earlier_deepfake_reading() {
    let mut engine = Engine::with_samples();
    engine.apply_deepfake("3", &deepfake("0.9")).unwrap();

    let err = engine
      .apply_analysis("3", None, &phishing(&[("bad", -0.1, true)]))
      .unwrap_err();
    assert!(matches!(err, AggregatorError::OutOfRange { .. }));
    let err = engine
      .apply_analysis("3", Some(&deepfake("0.1")), &phishing(&[("bad", 2.0, true)]))
      .unwrap_err();
    assert!(matches!(err, AggregatorError::OutOfRange { .. }));

    let snap = engine.session("3").unwrap();
    assert_eq!(snap.deepfake.percent, 90);
    assert!(snap.phishing_scores.is_empty());
    assert_eq!(engine.call("3").unwrap().call.category, CallCategory::NoContent);
  }

  #[test]
  fn malformed_line_is_a_json_error() {
    let mut engine = Engine::with_defaults();
    let err = engine.process_line("{\"op\": \"list_calls\"").unwrap_err();
    assert!(matches!(err, AggregatorError::Json(_)));
    assert!(err.field().is_none());
    assert!(matches!(
      engine.process_line(r#"{"op": "list_risk_numbers"}"#).unwrap(),
      Output::RiskNumbers { .. }
    ));
  }

  #[test]
  fn rejected_batch_leaves_state_untouched() {
    let mut engine = Engine::with_samples();
    engine
      .apply_phishing("3", &phishing(&[("first", 0.6, true)]))
      .unwrap();
    let err = engine
      .apply_phishing("3", &phishing(&[("ok", 0.9, true), ("bad", 1.7, true)]))
      .unwrap_err();
    assert!(matches!(err, AggregatorError::OutOfRange { .. }));
    let snap = engine.session("3").unwrap();
    assert_eq!(snap.phishing_scores.len(), 1);
    assert_eq!(snap.voice_risk.percent, 60);
    assert_eq!(snap.messages.len(), 1);
  }

  #[test]
  fn non_numeric_probability_is_rejected_without_mutation() {
    let mut engine = Engine::with_samples();
    engine.apply_deepfake("3", &deepfake("0.3")).unwrap();
    let err = engine.apply_deepfake("3", &deepfake("n/a")).unwrap_err();
    assert!(matches!(err, AggregatorError::Parse(_)));
    assert_eq!(engine.session("3").unwrap().deepfake.percent, 30);
  }

  #[test]
  fn unknown_call_is_an_error() {
    let mut engine = Engine::with_defaults();
    let err = engine
      .apply_phishing("missing", &phishing(&[("x", 0.1, false)]))
      .unwrap_err();
    assert!(matches!(err, AggregatorError::UnknownCall(_)));
    assert!(engine.decide("missing").is_err());
  }

  #[test]
  fn decide_without_analysis_is_safe() {
    let mut engine = Engine::with_samples();
    assert_eq!(engine.decide("1").unwrap(), CallCategory::Safe);
  }

  #[test]
  fn process_risk_number_commands() {
    let mut engine = Engine::with_defaults();
    engine
      .process(&Command::AddRiskNumber {
        number: " 010-1234-5678 ".into(),
      })
      .unwrap();
    engine
      .process(&Command::AddRiskNumber { number: "   ".into() })
      .unwrap();
    let out = engine.process(&Command::ListRiskNumbers).unwrap();
    match out {
      Output::RiskNumbers { numbers } => assert_eq!(numbers, vec!["010-1234-5678"]),
      other => panic!("unexpected output: {:?}", other),
    }
    engine
      .process(&Command::RemoveRiskNumber {
        number: "010-1234-5678".into(),
      })
      .unwrap();
    assert!(engine.risk_numbers().is_empty());
  }
}
