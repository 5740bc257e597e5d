//! Shared fixtures: in-memory archives and call-counting fakes.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use tradewatch_core::{ArchiveSource, EmailMessage, MailError, Mailer, RunContext, WatchError};
use zip::write::SimpleFileOptions;

pub const ARCHIVE_URL: &str = "https://disclosures.example.test/financial-pdfs/2025FD.zip";
pub const PDF_BASE_URL: &str = "https://disclosures.example.test/ptr-pdfs/2025/";

/// One disclosure row in the published column layout.
pub fn row(trader: &str, date: &str, doc: &str) -> String {
    format!("Hon.\t{trader}\tFirst\t\tP\tCA11\t2025\t{date}\t{doc}")
}

/// ALICE filed on the 15th and 17th, BOB on the 17th.
pub fn sample_records() -> String {
    let mut text =
        "Prefix\tLast\tFirst\tSuffix\tFilingType\tStateDst\tYear\tFilingDate\tDocID\r\n".to_string();
    for line in [
        row("ALICE", "01/15/2025", "DOC1"),
        row("ALICE", "01/17/2025", "DOC2"),
        row("BOB", "01/17/2025", "DOC3"),
    ] {
        text.push_str(&line);
        text.push_str("\r\n");
    }
    text
}

pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn sample_archive() -> Vec<u8> {
    let records = sample_records();
    zip_bytes(&[
        ("2025FD.txt", records.as_str()),
        ("2025FD.xml", "<FinancialDisclosure/>"),
    ])
}

pub fn context(trades_dir: &Path, trader: &str) -> RunContext {
    RunContext {
        archive_url: ARCHIVE_URL.into(),
        trader_name: trader.into(),
        from_email: "watch@example.test".into(),
        to_email: "me@example.test".into(),
        pdf_base_url: PDF_BASE_URL.into(),
        mail_api_key: "SG.test".into(),
        trades_dir: trades_dir.to_path_buf(),
        fetch_documents: false,
    }
}

/// Serves fixed bodies by URL and counts calls.
#[derive(Default)]
pub struct FakeSource {
    bodies: HashMap<String, Vec<u8>>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeSource {
    pub fn with(url: &str, body: Vec<u8>) -> Self {
        let mut source = Self::default();
        source.bodies.insert(url.to_string(), body);
        source
    }

    pub fn add(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ArchiveSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    fn get(&self, url: &str) -> Result<Vec<u8>, WatchError> {
        self.calls.borrow_mut().push(url.to_string());
        self.bodies.get(url).cloned().ok_or(WatchError::HttpStatus {
            status: 404,
            url: url.to_string(),
        })
    }
}

/// Records messages and answers with a fixed result.
pub struct FakeMailer {
    pub sent: RefCell<Vec<EmailMessage>>,
    fail: Cell<bool>,
}

impl FakeMailer {
    pub fn accepting() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail: Cell::new(false),
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail: Cell::new(true),
        }
    }
}

impl Mailer for FakeMailer {
    fn send(&self, message: &EmailMessage) -> Result<u16, MailError> {
        self.sent.borrow_mut().push(message.clone());
        if self.fail.get() {
            Err(MailError::Transport("connection reset".into()))
        } else {
            Ok(202)
        }
    }
}
