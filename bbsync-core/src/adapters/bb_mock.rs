//! Mock Banco do Brasil statement server for testing
//!
//! Serves the paginated statement endpoint over plain HTTP so the reqwest
//! transport's response handling can be exercised without certificates:
//! - GET /conta-corrente/agencia/{agency}/conta/{account}?numeroPagina=N&quantidadeRegistros=M&...
//!   returns one page of `listaLancamento`
//!
//! Requests must carry `Authorization: Bearer ...` and identical, non-empty
//! `gw-dev-app-key` / `X-Application-Key` headers.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use serde_json::{json, Value as JsonValue};

/// Mock statement server for testing
pub struct MockBankServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Configuration for mock data generation
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Lines in the whole statement; the last one is a "Saldo Atual" line
    pub total_records: usize,
    /// Whether to simulate authentication failure
    pub fail_auth: bool,
    /// Answer 200 with an empty body
    pub empty_body: bool,
    /// Answer 200 with a body that is not JSON
    pub malformed_body: bool,
    /// Answer 500 for this page number
    pub fail_page: Option<u32>,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            total_records: 25,
            fail_auth: false,
            empty_body: false,
            malformed_body: false,
            fail_page: None,
            delay_ms: 0,
        }
    }
}

impl MockBankServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(AtomicUsize::new(0));
        let running_clone = running.clone();
        let requests_clone = requests.clone();

        // Non-blocking so stop() is noticed
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        requests_clone.fetch_add(1, Ordering::SeqCst);
                        let cfg = config.clone();
                        thread::spawn(move || handle_connection(stream, &cfg));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Connections accepted so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBankServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig) {
    // The accepted socket inherits non-blocking mode on some platforms
    let _ = stream.set_nonblocking(false);
    let mut buffer = [0; 8192];
    let n = match stream.read(&mut buffer) {
        Ok(n) => n,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(&buffer[..n]);

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    let mut lines = request.lines();
    let first_line = lines.next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", r#"{"erro": "Invalid request"}"#);
        return;
    }
    let (method, target) = (parts[0], parts[1]);

    let headers: HashMap<String, String> = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let authorized = headers
        .get("authorization")
        .map(|v| v.len() > "bearer ".len() && v.to_lowercase().starts_with("bearer "))
        .unwrap_or(false);
    if config.fail_auth || !authorized {
        send_response(&mut stream, 401, "Unauthorized", r#"{"erro": "Token invalido"}"#);
        return;
    }

    let gw_key = headers.get("gw-dev-app-key").map(String::as_str).unwrap_or("");
    let app_key = headers.get("x-application-key").map(String::as_str).unwrap_or("");
    if gw_key.is_empty() || gw_key != app_key {
        send_response(&mut stream, 403, "Forbidden", r#"{"erro": "Chave de aplicacao invalida"}"#);
        return;
    }

    if method != "GET" {
        send_response(&mut stream, 405, "Method Not Allowed", r#"{"erro": "Method not allowed"}"#);
        return;
    }

    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    if !(path.contains("/conta-corrente/agencia/") && path.contains("/conta/")) {
        send_response(&mut stream, 404, "Not Found", r#"{"erro": "Endpoint not found"}"#);
        return;
    }

    let params: HashMap<&str, &str> = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect();
    let page: u32 = params
        .get("numeroPagina")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let page_size: usize = params
        .get("quantidadeRegistros")
        .and_then(|v| v.parse().ok())
        .unwrap_or(200);
    if !params.contains_key("dataInicioSolicitacao") || !params.contains_key("dataFimSolicitacao") {
        send_response(&mut stream, 400, "Bad Request", r#"{"erro": "Periodo obrigatorio"}"#);
        return;
    }

    if config.fail_page == Some(page) {
        send_response(&mut stream, 500, "Internal Server Error", r#"{"erro": "Falha interna"}"#);
        return;
    }
    if config.empty_body {
        send_response(&mut stream, 200, "OK", "");
        return;
    }
    if config.malformed_body {
        send_response(&mut stream, 200, "OK", "<html>gateway error</html>");
        return;
    }

    let body = statement_page(config.total_records, page, page_size.max(1));
    send_response(&mut stream, 200, "OK", &body.to_string());
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn statement_page(total_records: usize, page: u32, page_size: usize) -> JsonValue {
    let total_pages = total_records.div_ceil(page_size);
    let start = (page.saturating_sub(1) as usize) * page_size;
    let end = (start + page_size).min(total_records);

    let items: Vec<JsonValue> = (start..end)
        .map(|i| line_item(i, i + 1 == total_records))
        .collect();

    json!({
        "numeroPaginaAtual": page,
        "quantidadeRegistroPaginaAtual": items.len(),
        "numeroPaginaAnterior": page.saturating_sub(1),
        "numeroPaginaProximo": if (page as usize) < total_pages { page + 1 } else { 0 },
        "quantidadeTotalPagina": total_pages,
        "quantidadeTotalRegistro": total_records,
        "listaLancamento": items,
    })
}

fn line_item(index: usize, is_last: bool) -> JsonValue {
    if is_last {
        return json!({
            "indicadorTipoLancamento": "S",
            "dataLancamento": 31032024,
            "dataMovimento": 31032024,
            "numeroDocumento": 0,
            "codigoHistorico": 999,
            "textoDescricaoHistorico": "Saldo Atual",
            "valorLancamento": 4210.77,
            "indicadorSinalLancamento": "C",
            "textoInformacaoComplementar": "",
            "numeroCpfCnpjContrapartida": 0,
            "indicadorTipoPessoaContrapartida": "",
            "codigoBancoContrapartida": 0,
            "codigoAgenciaContrapartida": 0,
            "numeroContaContrapartida": "",
        });
    }

    let movements = [
        ("Pix - Enviado", 120.0, "D", "F", 12345678901_u64),
        ("Pix - Recebido", 350.5, "C", "F", 98765432100),
        ("Pagamento de Boleto", 89.9, "D", "J", 12345678000199),
        ("Tarifa Pacote Servicos", 32.0, "D", "", 0),
        ("Deposito Online", 1000.0, "C", "", 0),
    ];
    let (description, amount, sign, person_type, tax_id) = movements[index % movements.len()];
    let day = (index % 28) + 1;

    json!({
        "indicadorTipoLancamento": "1",
        "dataLancamento": format!("{}032024", day),
        "dataMovimento": format!("{}032024", day),
        "numeroDocumento": 100000 + index,
        "codigoHistorico": 800 + (index % 5),
        "textoDescricaoHistorico": description,
        "valorLancamento": amount,
        "indicadorSinalLancamento": sign,
        "textoInformacaoComplementar": format!("Lancamento {}", index + 1),
        "numeroCpfCnpjContrapartida": tax_id,
        "indicadorTipoPessoaContrapartida": person_type,
        "codigoBancoContrapartida": 1,
        "codigoAgenciaContrapartida": 1234,
        "numeroContaContrapartida": "000123456",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_server_starts() {
        let server = MockBankServer::start(MockConfig::default()).unwrap();
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
        assert_eq!(server.request_count(), 0);
    }

    #[test]
    fn test_statement_page_slicing() {
        let first = statement_page(25, 1, 10);
        assert_eq!(first["quantidadeTotalPagina"], 3);
        assert_eq!(first["quantidadeTotalRegistro"], 25);
        assert_eq!(first["listaLancamento"].as_array().unwrap().len(), 10);

        let last = statement_page(25, 3, 10);
        let items = last["listaLancamento"].as_array().unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[4]["textoDescricaoHistorico"], "Saldo Atual");

        let beyond = statement_page(25, 4, 10);
        assert!(beyond["listaLancamento"].as_array().unwrap().is_empty());
    }
}
