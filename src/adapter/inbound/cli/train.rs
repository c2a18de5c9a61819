//! Handler for the `train` command.

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::port::OperatorPort;

/// Train both models from the database and save them under `MODELS_DIR`.
pub async fn execute(operator: &dyn OperatorPort) -> Result<()> {
    let pb = output::spinner("Training models");
    let outcome = match operator.train().await {
        Ok(outcome) => outcome,
        Err(e) => {
            output::spinner_fail(&pb, "Training failed");
            return Err(e);
        }
    };

    if output::is_json() {
        pb.finish_and_clear();
        output::json_output(json!({
            "command": "train",
            "report": outcome,
        }));
        return Ok(());
    }

    output::spinner_success(&pb, &format!("Trained on {} cases", outcome.cases));
    match outcome.duration {
        Some(eval) => {
            output::section("Case duration (least squares)");
            output::field("Train/test", format!("{}/{}", eval.train_cases, eval.test_cases));
            output::field("MAE (hours)", format!("{:.2}", eval.error));
            output::field("R²", format!("{:.3}", eval.score));
        }
        None => output::warning("Duration model was not trained"),
    }
    match outcome.reopen_risk {
        Some(eval) => {
            output::section("Reopen risk (logistic)");
            output::field("Train/test", format!("{}/{}", eval.train_cases, eval.test_cases));
            output::field("Accuracy", format!("{:.3}", eval.score));
        }
        None => output::warning("Reopen-risk model was not trained"),
    }
    output::hint(&format!(
        "models saved to {}",
        output::muted(outcome.models_dir.display())
    ));
    Ok(())
}
