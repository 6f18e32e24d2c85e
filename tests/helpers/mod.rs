#![allow(dead_code)]

use std::{
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use formrelay::{
    AppState, Config,
    config::{AppConfig, CorsConfig, LoggingConfig, MailConfig, MailSecurity, RecaptchaConfig, ServerConfig},
    mailer::{MailError, Mailer, OutgoingEmail},
    recaptcha::{TokenVerifier, Verification, VerifyError},
    router,
};
use http_body_util::BodyExt;
use tracing_subscriber::fmt::MakeWriter;

pub const ENDPOINT: &str = "/api/email";
pub const HOST: &str = "portfolio.example.com";

pub fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            endpoint: ENDPOINT.to_string(),
            static_dir: None,
        },
        app: AppConfig {
            name: "Portfolio".to_string(),
            env: "local".to_string(),
        },
        cors: CorsConfig {
            allow_origin: "https://portfolio.example.com;https://www.portfolio.example.com"
                .to_string(),
        },
        recaptcha: RecaptchaConfig {
            verify_url: "http://127.0.0.1:9/siteverify".to_string(),
            secret_key: "test-secret".to_string(),
            timeout_secs: 1,
        },
        mail: MailConfig {
            host: "localhost".to_string(),
            port: 1025,
            auth: false,
            username: String::new(),
            password: String::new(),
            secure: MailSecurity::None,
            from: "noreply@example.com".to_string(),
            from_name: None,
            to: "owner@example.com".to_string(),
            timeout_secs: 1,
        },
        logging: LoggingConfig::default(),
    }
}

#[derive(Clone, Copy, Debug)]
pub enum VerifierBehavior {
    Pass,
    Reject,
    Unreachable,
}

/// In-process stand-in for the siteverify service.
#[derive(Clone)]
pub struct FakeVerifier {
    behavior: VerifierBehavior,
    pub tokens: Arc<Mutex<Vec<String>>>,
}

impl FakeVerifier {
    pub fn new(behavior: VerifierBehavior) -> Self {
        Self {
            behavior,
            tokens: Arc::default(),
        }
    }
}

#[async_trait]
impl TokenVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<Verification, VerifyError> {
        self.tokens.lock().unwrap().push(token.to_owned());

        match self.behavior {
            VerifierBehavior::Pass => Ok(Verification::passed()),
            VerifierBehavior::Reject => Ok(Verification {
                score: Some(0.1),
                action: Some("contact".to_string()),
                ..Verification::rejected(["invalid-input-response"])
            }),
            VerifierBehavior::Unreachable => Err(VerifyError::Status(503)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum MailerBehavior {
    Deliver,
    Fail,
    Panic,
}

/// Records outgoing mail instead of talking to a relay.
#[derive(Clone)]
pub struct FakeMailer {
    behavior: MailerBehavior,
    pub sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    pub attempts: Arc<AtomicUsize>,
}

impl FakeMailer {
    pub fn new(behavior: MailerBehavior) -> Self {
        Self {
            behavior,
            sent: Arc::default(),
            attempts: Arc::default(),
        }
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MailerBehavior::Deliver => {
                self.sent.lock().unwrap().push(email);
                Ok(())
            }
            MailerBehavior::Fail => Err(MailError::NoRecipients),
            MailerBehavior::Panic => panic!("relay state corrupted"),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub verifier: FakeVerifier,
    pub mailer: FakeMailer,
}

impl TestApp {
    pub fn new(verifier: VerifierBehavior, mailer: MailerBehavior) -> Self {
        Self::with_config(create_test_config(), verifier, mailer)
    }

    pub fn with_config(config: Config, verifier: VerifierBehavior, mailer: MailerBehavior) -> Self {
        let verifier = FakeVerifier::new(verifier);
        let mailer = FakeMailer::new(mailer);
        let state = AppState::new(config, verifier.clone(), mailer.clone());

        Self {
            router: router(state),
            verifier,
            mailer,
        }
    }

    pub fn verify_calls(&self) -> usize {
        self.verifier.tokens.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.mailer.sent.lock().unwrap().clone()
    }
}

pub fn valid_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("send", "1"),
        ("from", "john@example.com"),
        ("firstname", "John"),
        ("lastname", "Doe"),
        ("subject", "Freelance project"),
        ("message", "Hello,\nI would like to work with you."),
        ("g-recaptcha-response", "03AGdBq24-token"),
    ]
}

pub fn without(field: &str) -> Vec<(&'static str, &'static str)> {
    valid_fields()
        .into_iter()
        .filter(|(name, _)| *name != field)
        .collect()
}

pub fn with(field: &'static str, value: &'static str) -> Vec<(&'static str, &'static str)> {
    let mut fields = without(field);
    fields.push((field, value));
    fields
}

pub fn form_request(fields: &[(&str, &str)]) -> Request<Body> {
    let body = serde_urlencoded::to_string(fields).unwrap();

    Request::builder()
        .method(Method::POST)
        .uri(ENDPOINT)
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub fn multipart_request(fields: &[(&str, &str)]) -> Request<Body> {
    let boundary = "----formrelayboundary7MA4YWxkTrZu0gW";
    let mut body = String::new();

    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method(Method::POST)
        .uri(ENDPOINT)
        .header(header::HOST, HOST)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Collects formatted log lines for the current thread, error level unless
/// asked otherwise.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        self.install_at(tracing::Level::ERROR)
    }

    pub fn install_at(&self, level: tracing::Level) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(level)
            .with_ansi(false)
            .finish();

        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
