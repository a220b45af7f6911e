//! Certs command - resolve a wallet's mutual TLS material

use anyhow::{anyhow, Context, Result};

use bbsync_core::OperationResult;

use super::get_context;
use crate::output;

pub fn run(wallet: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.bank_service.resolve_certificates(wallet);

    if json {
        let failure = result.as_ref().err().map(|e| e.to_string());
        output::print_json(&OperationResult::from(result))?;
        return match failure {
            Some(e) => Err(anyhow!(e)),
            None => Ok(()),
        };
    }

    let resolution = result.with_context(|| format!("No certificates for wallet '{}'", wallet))?;

    if resolution.files_written > 0 {
        output::success(&format!(
            "Wrote {} certificate files from wallet metadata",
            resolution.files_written
        ));
    } else {
        output::success("Certificates already on disk");
    }

    let mut table = output::create_table();
    table.set_header(vec!["File", "Path"]);
    let certificates = &resolution.certificates;
    table.add_row(vec!["CA bundle".to_string(), certificates.ca_cert_path.display().to_string()]);
    table.add_row(vec![
        "Client certificate".to_string(),
        certificates.client_cert_path.display().to_string(),
    ]);
    table.add_row(vec![
        "Private key".to_string(),
        certificates.private_key_path.display().to_string(),
    ]);
    println!("{}", table);

    Ok(())
}
