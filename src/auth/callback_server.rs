//! auth::callback_server
//!
//! Local HTTP server receiving the token from the browser login.
//!
//! # Flow
//!
//! 1. [`CallbackServer::bind`] takes the first free port in the range
//! 2. The console page redirects to `http://localhost:<port>/?token=...`
//! 3. The first request carrying a token wins. Its answer waits until the
//!    caller reports through [`CallbackReply`] whether the token was
//!    verified, then the server shuts down
//!
//! Requests that arrive after the token was taken are answered with 409 and
//! otherwise ignored. Requests without a token (favicon probes and the like)
//! get 400 and do not consume the server.

use std::ops::RangeInclusive;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use tiny_http::{Header, Request, Response, Server};
use tokio::sync::oneshot;

use super::AuthError;

/// Ports probed for the callback server.
pub const PORT_RANGE: RangeInclusive<u16> = 3001..=3100;

/// How long the browser has to call back.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How long the browser is kept waiting for the verification outcome.
const REPLY_TIMEOUT: Duration = Duration::from_secs(60);

const SUCCESS_PAGE: &str = "<!doctype html><html><body>\
<h2>Authentication successful</h2><p>You can close this window and return to the terminal.</p>\
</body></html>";

const REJECTED_PAGE: &str = "<!doctype html><html><body>\
<h2>Authentication failed</h2><p>The token could not be verified. Return to the terminal and try again.</p>\
</body></html>";

const MISSING_TOKEN_PAGE: &str = "<!doctype html><html><body>\
<h2>Authentication failed</h2><p>No token was provided.</p></body></html>";

const ALREADY_USED_PAGE: &str = "<!doctype html><html><body>\
<h2>Already authenticated</h2><p>This login link has already been used.</p></body></html>";

/// A bound, not yet serving, callback server.
pub struct CallbackServer {
    server: Arc<Server>,
    port: u16,
}

impl CallbackServer {
    /// Bind to the first free port in `ports` on the loopback interface.
    pub fn bind(ports: RangeInclusive<u16>) -> Result<Self, AuthError> {
        for port in ports.clone() {
            match Server::http(("127.0.0.1", port)) {
                Ok(server) => {
                    log::debug!("login callback server listening on port {}", port);
                    return Ok(Self {
                        server: Arc::new(server),
                        port,
                    });
                }
                Err(e) => log::trace!("port {} unavailable: {}", port, e),
            }
        }
        Err(AuthError::NoFreePort {
            start: *ports.start(),
            end: *ports.end(),
        })
    }

    /// The bound port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// URL the console should redirect to.
    pub fn callback_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Serve until one token arrives, the timeout elapses, or the returned
    /// future is dropped. The server is closed in every case.
    ///
    /// The browser that delivered the token gets its answer once the
    /// returned [`CallbackReply`] is sent or dropped.
    pub async fn wait_for_token(
        self,
        timeout: Duration,
    ) -> Result<(String, CallbackReply), AuthError> {
        let (tx, rx) = oneshot::channel();
        let _shutdown = ShutdownOnDrop(Arc::clone(&self.server));

        let server = Arc::clone(&self.server);
        std::thread::Builder::new()
            .name("login-callback".into())
            .spawn(move || serve(&server, tx))?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(token)) => Ok(token),
            Ok(Err(_)) => Err(AuthError::CallbackServer(
                "server stopped before a token arrived".into(),
            )),
            Err(_) => Err(AuthError::CallbackTimeout),
        }
    }
}

/// Outcome of a callback token, reported back to the waiting browser.
///
/// Dropping it unsent answers the browser with the failure page.
#[derive(Debug)]
pub struct CallbackReply(mpsc::Sender<bool>);

impl CallbackReply {
    /// Report whether the token was accepted.
    pub fn send(self, accepted: bool) {
        if self.0.send(accepted).is_err() {
            log::debug!("login callback request already answered");
        }
    }
}

struct ShutdownOnDrop(Arc<Server>);

impl Drop for ShutdownOnDrop {
    fn drop(&mut self) {
        self.0.unblock();
    }
}

fn serve(server: &Server, tx: oneshot::Sender<(String, CallbackReply)>) {
    let mut tx = Some(tx);
    while let Ok(request) = server.recv() {
        match token_from_url(request.url()) {
            Some(token) => match tx.take() {
                Some(sender) => {
                    let (reply_tx, reply_rx) = mpsc::channel();
                    if sender.send((token, CallbackReply(reply_tx))).is_err() {
                        log::debug!("login callback arrived after the flow finished");
                    }
                    match reply_rx.recv_timeout(REPLY_TIMEOUT) {
                        Ok(true) => respond(request, 200, SUCCESS_PAGE),
                        Ok(false) => respond(request, 401, REJECTED_PAGE),
                        Err(_) => respond(request, 503, REJECTED_PAGE),
                    }
                    server.unblock();
                }
                None => respond(request, 409, ALREADY_USED_PAGE),
            },
            None => respond(request, 400, MISSING_TOKEN_PAGE),
        }
    }
    log::debug!("login callback server stopped");
}

fn respond(request: Request, status: u16, body: &str) {
    let mut response = Response::from_string(body).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..]) {
        response = response.with_header(header);
    }
    if let Err(e) = request.respond(response) {
        log::debug!("failed to answer login callback: {}", e);
    }
}

/// Extract a non-empty `token` query parameter from a request target.
pub(crate) fn token_from_url(target: &str) -> Option<String> {
    let parsed = url::Url::parse(&format!("http://localhost{}", target)).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
