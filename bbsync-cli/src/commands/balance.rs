//! Balance command - current balance from the latest statement

use anyhow::{anyhow, Context, Result};
use colored::Colorize;

use bbsync_core::OperationResult;

use super::{get_context, ConnectionArgs};
use crate::output;

pub fn run(connection: ConnectionArgs, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.bank_service.fetch_balance(
        &connection.agency,
        &connection.account,
        connection.connection_ref(),
        &connection.app_key,
        &connection.wallet,
    );

    if json {
        let failure = result.as_ref().err().map(|e| e.to_string());
        output::print_json(&OperationResult::from(result))?;
        return match failure {
            Some(e) => Err(anyhow!(e)),
            None => Ok(()),
        };
    }

    match result.context("Failed to fetch balance")? {
        Some(balance) => {
            println!("{}", output::format_brl(balance.amount).bold());
            println!("  {} on {}", balance.marker, balance.as_of.format("%d/%m/%Y"));
        }
        None => output::warning(&format!(
            "No balance line in the last {} days of statements.",
            ctx.config.balance_lookback_days
        )),
    }

    Ok(())
}
