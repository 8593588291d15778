//! Sales tax calculation tool.
//!
//! Computes sales tax from a transaction amount and a jurisdiction, using a
//! static rate table from configuration. An unsupported jurisdiction is a
//! domain condition, not a protocol error: the tool answers with text
//! listing the jurisdictions it does know, so a calling agent can recover.

use std::sync::Arc;

use futures::FutureExt;
use tracing::info;

use crate::core::config::TaxConfig;
use crate::domains::tools::definition::{ToolContent, ToolDefinition};
use crate::domains::tools::schema::{InputSchema, ParamType};

/// Sales tax calculation tool.
pub struct CalculateTaxTool;

impl CalculateTaxTool {
    /// Tool name as registered.
    pub const NAME: &'static str = "calculate-tax";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Calculates sales tax based on amount and jurisdiction. Returns the tax amount and the total including tax.";

    /// Build the tool definition against the configured rate table.
    pub fn definition(config: Arc<TaxConfig>) -> ToolDefinition {
        let schema = InputSchema::new()
            .required("amount", ParamType::Number, "The transaction amount")
            .required(
                "jurisdiction",
                ParamType::String,
                "The tax jurisdiction (e.g. Texas, California)",
            );

        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            schema,
            Arc::new(move |params| {
                let config = config.clone();
                async move {
                    let amount = params
                        .get("amount")
                        .and_then(serde_json::Value::as_f64)
                        .unwrap_or_default();
                    let jurisdiction = params
                        .get("jurisdiction")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();

                    Ok(vec![ToolContent::text(Self::execute(
                        amount,
                        &jurisdiction,
                        &config,
                    ))])
                }
                .boxed()
            }),
        )
    }

    /// Compute the response text for an amount and jurisdiction.
    pub fn execute(amount: f64, jurisdiction: &str, config: &TaxConfig) -> String {
        info!(
            "Calculating tax: amount={}, jurisdiction={}",
            amount, jurisdiction
        );

        match config.rate(jurisdiction) {
            Some(rate) => {
                let tax = amount * rate;
                let total = amount + tax;
                format!(
                    "Sales tax for {jurisdiction}: Amount = ${amount:.2}, Tax = ${tax:.2}, Total = ${total:.2} (rate {:.2}%)",
                    rate * 100.0
                )
            }
            None => format!(
                "Sorry, I don't have a tax rate for '{jurisdiction}'. Supported jurisdictions: {}.",
                config.jurisdictions().join(", ")
            ),
        }
    }
}
