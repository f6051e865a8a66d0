//! roll_dice tool: roll six-sided dice after the human confirms

use mcpbot_domain::elicitation::{ElicitationOutcome, ElicitationPrompt, ExpectedShape};
use mcpbot_domain::tool::{
    context::ToolContext,
    entities::{ToolAnnotations, ToolCall, ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolResult},
};
use rand::Rng;
use serde_json::json;
use tracing::{debug, info};

/// Tool name constant
pub const ROLL_DICE: &str = "roll_dice";

/// Upper bound on dice per roll
pub const MAX_DICE: i64 = 100;

/// Get the tool definition for roll_dice
pub fn roll_dice_definition() -> ToolDefinition {
    ToolDefinition::new(ROLL_DICE, "Throw dices and returns the roll.")
        .with_annotations(
            ToolAnnotations::titled("The Dice Roller")
                .read_only()
                .idempotent(),
        )
        .with_parameter(
            ToolParameter::new("n_dice", "Number of six-sided dice to roll", true)
                .with_type("integer"),
        )
}

/// Confirmation question shown to the human.
pub fn confirmation_prompt(n_dice: i64) -> ElicitationPrompt {
    ElicitationPrompt::new(
        format!("Do you want to roll {} dice? (yes/y to confirm)", n_dice),
        ExpectedShape::confirmation(),
    )
}

/// Execute the roll_dice tool
///
/// Suspends on the session's elicitor until the human confirms, declines,
/// or the session goes away.
pub async fn execute_roll_dice(call: &ToolCall, ctx: &ToolContext) -> ToolResult {
    let n_dice = match call.require_i64("n_dice") {
        Ok(n) => n,
        Err(e) => return ToolResult::failure(ROLL_DICE, ToolError::invalid_argument(e)),
    };
    if !(1..=MAX_DICE).contains(&n_dice) {
        return ToolResult::failure(
            ROLL_DICE,
            ToolError::invalid_argument(format!(
                "n_dice must be between 1 and {}, got {}",
                MAX_DICE, n_dice
            )),
        );
    }

    debug!(n_dice, "Asking for roll confirmation");
    let outcome = match ctx.elicitor().elicit(confirmation_prompt(n_dice)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            return ToolResult::failure(
                ROLL_DICE,
                ToolError::busy(format!("{}; ask again once it is answered", e)),
            );
        }
    };

    match outcome {
        ElicitationOutcome::Answered(_) => {
            let rolls = roll(n_dice as usize);
            let total: u32 = rolls.iter().sum();
            info!(n_dice, total, "Dice rolled");
            ToolResult::json(
                ROLL_DICE,
                json!({
                    "success": true,
                    "rolls": rolls,
                    "total": total,
                    "message": format!("Rolled {} dice: {:?}. Total: {}", n_dice, rolls, total),
                }),
            )
        }
        ElicitationOutcome::Declined => ToolResult::failure(
            ROLL_DICE,
            ToolError::not_performed("Dice roll cancelled by user"),
        ),
        ElicitationOutcome::Aborted(reason) => ToolResult::failure(
            ROLL_DICE,
            ToolError::not_performed(format!("Dice roll not performed: {}", reason)),
        ),
    }
}

fn roll(n_dice: usize) -> Vec<u32> {
    let mut rng = rand::thread_rng();
    (0..n_dice).map(|_| rng.gen_range(1..=6)).collect()
}
