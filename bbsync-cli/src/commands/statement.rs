//! Statement command - fetch and classify a full statement

use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use comfy_table::Cell;

use bbsync_core::services::is_balance_marker;
use bbsync_core::{DateParam, OperationResult, StatementOptions};

use super::{get_context, ConnectionArgs};
use crate::output;

pub fn run(
    connection: ConnectionArgs,
    from: Option<DateParam>,
    to: Option<DateParam>,
    page_size: Option<u32>,
    deadline_secs: Option<u64>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let options = StatementOptions {
        date_from: from,
        date_to: to,
        wallet_ref: Some(connection.wallet.clone()),
        page_size,
        deadline: deadline_secs.map(|secs| Instant::now() + Duration::from_secs(secs)),
        today: None,
    };

    let result = ctx.bank_service.fetch_statement(
        &connection.agency,
        &connection.account,
        connection.connection_ref(),
        &connection.app_key,
        options,
    );

    if json {
        let failure = result.as_ref().err().map(|e| e.to_string());
        output::print_json(&OperationResult::from(result))?;
        return match failure {
            Some(e) => Err(anyhow!(e)),
            None => Ok(()),
        };
    }

    let statement = result.context("Failed to fetch statement")?;

    if statement.items.is_empty() {
        output::warning("No statement lines in the requested period.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Description", "Amount", "Bank"]);
    for tx in &statement.items {
        table.add_row(vec![
            Cell::new(tx.movement_date.format("%d/%m/%Y")),
            Cell::new(&tx.operation_description),
            output::amount_cell(tx.amount, tx.direction),
            Cell::new(tx.counterparty_bank.as_deref().unwrap_or("")),
        ]);
    }
    println!("{}", table);
    println!();

    println!(
        "{} lines across {} page(s)",
        statement.items.len().to_string().bold(),
        statement.total_pages
    );
    if !statement.is_complete() {
        output::warning(&format!(
            "The bank reported {} lines; the statement may be incomplete.",
            statement.total_record_count
        ));
    }
    println!(
        "Net movement: {}",
        output::format_brl(statement.net_movement(is_balance_marker))
    );
    match &statement.balance {
        Some(balance) => println!(
            "Balance ({} on {}): {}",
            balance.marker,
            balance.as_of.format("%d/%m/%Y"),
            output::format_brl(balance.amount).bold()
        ),
        None => output::warning("No balance line found in this statement."),
    }

    Ok(())
}
