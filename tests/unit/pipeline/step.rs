use super::*;

struct Failing;

impl Step for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn post_process(&self, _ctx: &mut StepContext) -> StoryResult<()> {
        Err(anyhow::anyhow!("disk full").into())
    }
}

#[test]
fn from_config_orders_standard_steps() {
    let p = Pipeline::from_config(&PipelineConfig::default(), None).unwrap();
    assert_eq!(p.step_names(), vec!["filter", "precision"]);

    let cfg = PipelineConfig {
        widescreen: true,
        round: false,
        ..PipelineConfig::default()
    };
    let p = Pipeline::from_config(&cfg, None).unwrap();
    assert_eq!(p.step_names(), vec!["filter", "widescreen"]);
}

#[test]
fn from_config_validates() {
    let cfg = PipelineConfig {
        move_precision: 99,
        ..PipelineConfig::default()
    };
    assert!(Pipeline::from_config(&cfg, None).is_err());
}

#[test]
fn run_names_the_failing_step() {
    let p = Pipeline::new().with_step(Failing);
    let mut ctx = StepContext::default();
    assert!(p.run(Phase::PreGenerate, &mut ctx).is_ok());

    let err = p.run(Phase::PostProcess, &mut ctx).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("failing"), "{msg}");
    assert!(msg.contains("PostProcess"), "{msg}");
}
