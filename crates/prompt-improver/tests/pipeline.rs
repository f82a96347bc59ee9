//! End-to-end runs of the improver against a scripted model.

use prompt_improver::completion::{Completion, CompletionFuture};
use prompt_improver::config::{ACCEPTANCE_MESSAGE, ImproverConfig};
use prompt_improver::criteria::{
    CriteriaRegistry, Criterion, DEFAULT_CRITERIA, FEW_SHOT_CRITERION,
};
use prompt_improver::error::CompletionError;
use prompt_improver::events::{FnEventHandler, ImproverEvent};
use prompt_improver::get_upd_prompt_by_recs;
use prompt_improver::pipeline::{Improver, RepairAction};
use prompt_improver::templates::PromptTemplates;
use std::sync::Mutex;

type Responder = dyn Fn(&str) -> Result<String, CompletionError> + Send + Sync;

/// Answers each request through `respond` and records every request text.
struct Scripted {
    respond: Box<Responder>,
    calls: Mutex<Vec<String>>,
}

impl Scripted {
    fn new<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Result<String, CompletionError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Completion for Scripted {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        self.calls.lock().unwrap().push(prompt.to_string());
        let reply = (self.respond)(prompt);
        Box::pin(async move { reply })
    }
}

/// Templates whose rendered text is easy to take apart in assertions.
fn tagged_templates() -> PromptTemplates {
    PromptTemplates {
        check: "CHECK|{{ manager_prompt }}|{{ point }}".into(),
        revise: "REVISE|{{ manager_prompt }}|{{ missing_points }}".into(),
        few_shot: "FEWSHOT|{{ zero_shot_prompt }}".into(),
    }
}

fn tagged_config() -> ImproverConfig {
    ImproverConfig::default().with_templates(tagged_templates())
}

/// Replies `нет` to checks of the `unmet` criteria, `R1` to revisions and
/// `F1` to few-shot requests.
fn model_failing(unmet: &[&'static str]) -> Scripted {
    let unmet = unmet.to_vec();
    Scripted::new(move |request| {
        if let Some(rest) = request.strip_prefix("CHECK|") {
            let failed = unmet.iter().any(|c| rest.ends_with(c));
            Ok(if failed { "нет" } else { "да" }.to_string())
        } else if request.starts_with("REVISE|") {
            Ok("R1".to_string())
        } else if request.starts_with("FEWSHOT|") {
            Ok("F1".to_string())
        } else {
            panic!("unexpected request: {request}")
        }
    })
}

#[tokio::test]
async fn compliant_prompt_is_accepted_without_repair_calls() {
    let model = model_failing(&[]);
    let revision = Improver::new(&model, tagged_config())
        .revise("P")
        .await
        .unwrap();

    assert_eq!(revision.text(), ACCEPTANCE_MESSAGE);
    assert_eq!(revision.action, RepairAction::Accept);
    assert!(revision.is_accepted());
    assert!(revision.gaps.is_empty());
    assert_eq!(revision.model_calls, 8);
    assert_eq!(model.calls().len(), 8);
}

#[tokio::test]
async fn checks_each_criterion_once_in_order() {
    let model = model_failing(&[]);
    Improver::new(&model, tagged_config())
        .revise("P")
        .await
        .unwrap();

    let expected: Vec<String> = DEFAULT_CRITERIA
        .iter()
        .map(|c| format!("CHECK|P|{c}"))
        .collect();
    assert_eq!(model.calls(), expected);
}

#[tokio::test]
async fn unmet_criteria_are_revised_in_one_call() {
    let model = model_failing(&[DEFAULT_CRITERIA[0], DEFAULT_CRITERIA[2]]);
    let revision = Improver::new(&model, tagged_config())
        .revise("P")
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 9);
    assert_eq!(
        calls[8],
        format!("REVISE|P|{}\n{}", DEFAULT_CRITERIA[0], DEFAULT_CRITERIA[2])
    );
    assert_eq!(revision.text(), "R1");
    assert_eq!(revision.action, RepairAction::Revise);
    assert_eq!(revision.gaps.len(), 2);
    assert_eq!(revision.model_calls, 9);
}

#[tokio::test]
async fn few_shot_gap_alone_adds_examples_to_original_prompt() {
    let model = model_failing(&[FEW_SHOT_CRITERION]);
    let revision = Improver::new(&model, tagged_config())
        .revise("P")
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 9);
    assert_eq!(calls[8], "FEWSHOT|P");
    assert_eq!(revision.text(), "F1");
    assert_eq!(revision.action, RepairAction::FewShotOnly);
}

#[tokio::test]
async fn few_shot_step_receives_revised_text() {
    let model = model_failing(&[DEFAULT_CRITERIA[1], FEW_SHOT_CRITERION]);
    let revision = Improver::new(&model, tagged_config())
        .revise("P")
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 10);
    assert_eq!(calls[8], format!("REVISE|P|{}", DEFAULT_CRITERIA[1]));
    assert_eq!(calls[9], "FEWSHOT|R1");
    assert_eq!(revision.text(), "F1");
    assert_eq!(revision.action, RepairAction::ReviseWithFewShot);
    assert_eq!(revision.model_calls, 10);

    let gaps: Vec<&str> = revision.gaps.iter().map(Criterion::text).collect();
    assert_eq!(gaps, [DEFAULT_CRITERIA[1], FEW_SHOT_CRITERION]);
}

#[tokio::test]
async fn braces_in_model_output_are_not_placeholders() {
    let model = Scripted::new(|request| {
        if request.starts_with("CHECK|") {
            let unmet = [FEW_SHOT_CRITERION, DEFAULT_CRITERIA[0]];
            let failed = unmet.iter().any(|c| request.ends_with(c));
            Ok(if failed { "нет" } else { "да" }.to_string())
        } else if request.starts_with("REVISE|") {
            Ok("{{ zero_shot_prompt }} {% raw %}{manager_prompt}".to_string())
        } else {
            Ok("done".to_string())
        }
    });
    Improver::new(&model, tagged_config())
        .revise("{{ point }}")
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(
        calls[0],
        format!("CHECK|{{{{ point }}}}|{}", DEFAULT_CRITERIA[0])
    );
    assert_eq!(
        calls[9],
        "FEWSHOT|{{ zero_shot_prompt }} {% raw %}{manager_prompt}"
    );
}

#[tokio::test]
async fn unrenderable_template_fails_before_the_call() {
    let mut templates = tagged_templates();
    templates.few_shot = "FEWSHOT|{{ zero_shot_prompt }}|{{ examples }}".into();
    assert!(templates.validate().is_err());

    let model = model_failing(&[FEW_SHOT_CRITERION, DEFAULT_CRITERIA[0]]);
    let err = Improver::new(&model, ImproverConfig::default().with_templates(templates))
        .revise("P")
        .await
        .unwrap_err();

    assert!(matches!(err, CompletionError::Render(_)));
    assert!(!err.is_transient());
    // Eight checks and the revision; the few-shot request is never sent.
    let calls = model.calls();
    assert_eq!(calls.len(), 9);
    assert!(!calls.iter().any(|c| c.starts_with("FEWSHOT|")));
}

#[tokio::test]
async fn check_failure_aborts_the_run() {
    let model = Scripted::new({
        let seen = Mutex::new(0usize);
        move |_| {
            let mut n = seen.lock().unwrap();
            *n += 1;
            if *n == 3 {
                Err(CompletionError::Status {
                    status: 503,
                    body: "unavailable".into(),
                })
            } else {
                Ok("да".to_string())
            }
        }
    });
    let err = Improver::new(&model, tagged_config())
        .revise("P")
        .await
        .unwrap_err();

    assert!(matches!(err, CompletionError::Status { status: 503, .. }));
    assert!(err.is_transient());
    assert_eq!(model.calls().len(), 3);
}

#[tokio::test]
async fn revision_failure_is_returned_unchanged() {
    let model = Scripted::new(|request| {
        if request.starts_with("CHECK|") {
            Ok("нет".to_string())
        } else {
            Err(CompletionError::Api("quota exceeded".into()))
        }
    });
    let err = Improver::new(&model, tagged_config())
        .revise("P")
        .await
        .unwrap_err();

    assert!(matches!(err, CompletionError::Api(ref m) if m == "quota exceeded"));
    // The few-shot step is never reached.
    assert_eq!(model.calls().len(), 9);
}

#[tokio::test]
async fn verdicts_tolerate_surrounding_whitespace_only() {
    let model = Scripted::new(|request| {
        if request.ends_with(DEFAULT_CRITERIA[0]) {
            Ok(" нет\n".to_string())
        } else if request.ends_with(DEFAULT_CRITERIA[1]) {
            Ok("Нет".to_string())
        } else if request.ends_with(DEFAULT_CRITERIA[2]) {
            Ok("нет.".to_string())
        } else if request.starts_with("CHECK|") {
            Ok("да".to_string())
        } else {
            Ok("R1".to_string())
        }
    });
    let revision = Improver::new(&model, tagged_config())
        .revise("P")
        .await
        .unwrap();

    let gaps: Vec<&str> = revision.gaps.iter().map(Criterion::text).collect();
    assert_eq!(gaps, [DEFAULT_CRITERIA[0]]);
}

#[tokio::test]
async fn custom_registry_without_few_shot_designation() {
    let model = Scripted::new(|request| {
        if request.starts_with("CHECK|") {
            Ok("нет".to_string())
        } else {
            Ok("R1".to_string())
        }
    });
    let config = tagged_config().with_registry(CriteriaRegistry::new(["a", FEW_SHOT_CRITERION]));
    let revision = Improver::new(&model, config).revise("P").await.unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2], format!("REVISE|P|a\n{FEW_SHOT_CRITERION}"));
    assert_eq!(revision.action, RepairAction::Revise);
}

#[tokio::test]
async fn events_trace_the_run() {
    let model = model_failing(&[DEFAULT_CRITERIA[3]]);
    let seen = Mutex::new(Vec::new());
    let handler = FnEventHandler::new(|event| {
        let label = match event {
            ImproverEvent::RunStarted { criteria, .. } => format!("start:{criteria}"),
            ImproverEvent::CriterionChecked { verdict, .. } => format!("check:{verdict}"),
            ImproverEvent::GapsCollected { gaps } => format!("gaps:{}", gaps.len()),
            ImproverEvent::Accepted => "accepted".to_string(),
            ImproverEvent::StepStarted { index, .. } => format!("step:{index}"),
            ImproverEvent::StepFinished { output, .. } => format!("done:{output}"),
            ImproverEvent::Finished { model_calls, .. } => format!("finished:{model_calls}"),
        };
        seen.lock().unwrap().push(label);
    });

    Improver::new(&model, tagged_config())
        .with_event_handler(&handler)
        .revise("P")
        .await
        .unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.first().map(String::as_str), Some("start:8"));
    assert_eq!(seen.iter().filter(|l| l.starts_with("check:")).count(), 8);
    assert_eq!(
        seen[9..],
        ["gaps:1", "step:0", "done:R1", "finished:9"].map(String::from)
    );
}

// ── Stock templates ────────────────────────────────────────────────

/// Replies `нет` when the check request names one of `unmet`, as the
/// stock check template renders `Критерий: <text>`.
fn stock_model(unmet: &[&'static str]) -> Scripted {
    let unmet = unmet.to_vec();
    Scripted::new(move |request| {
        if request.contains("Критерий: ") {
            let failed = unmet.iter().any(|c| request.contains(&format!("Критерий: {c}")));
            Ok(if failed { "нет" } else { "да" }.to_string())
        } else if request.contains("Улучшенный промпт:") {
            Ok("Ты - кинокритик. Напиши отзыв о фильме.".to_string())
        } else {
            Ok("Ты - кинокритик. Напиши отзыв о фильме.\nПример 1: ...".to_string())
        }
    })
}

#[tokio::test]
async fn stock_pipeline_instruction_and_few_shot_gaps() {
    let model = stock_model(&[DEFAULT_CRITERIA[1], DEFAULT_CRITERIA[7]]);
    let text = get_upd_prompt_by_recs(&model, "Напиши отзыв о фильме")
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 10);

    let revise = &calls[8];
    assert!(revise.contains("Исходный промпт: Напиши отзыв о фильме"));
    assert!(revise.contains(DEFAULT_CRITERIA[1]));
    assert!(!revise.contains(FEW_SHOT_CRITERION));

    let few_shot = &calls[9];
    assert!(few_shot.contains("Исходный промпт: Ты - кинокритик. Напиши отзыв о фильме."));
    assert!(few_shot.contains("добавь 3 few-shot примера"));

    assert!(text.ends_with("Пример 1: ..."));
}

#[tokio::test]
async fn stock_pipeline_accepts_compliant_prompt() {
    let model = stock_model(&[]);
    let text = get_upd_prompt_by_recs(&model, "Ты - кинокритик. Напиши отзыв о фильме.")
        .await
        .unwrap();

    assert_eq!(text, "Промпт хороший, в серьезных изменениях не нуждается.");
    assert_eq!(model.calls().len(), 8);
}
