//! Local Tesseract OCR engine (runs the `tesseract` binary).

use std::process::Stdio;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::{OcrEngine, OcrInput, OcrOutput};

/// Word-level rows in Tesseract's TSV output.
const WORD_LEVEL: u32 = 5;

pub struct TesseractEngine {
    binary: String,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait::async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, input: &OcrInput<'_>) -> anyhow::Result<OcrOutput> {
        if !input.image.is_recognized_format() {
            anyhow::bail!(
                "Unsupported image format for {} ({})",
                input.image.filename,
                input.image.mime
            );
        }

        info!(
            "TesseractEngine: recognizing {} ({} bytes, lang={})",
            input.image.filename,
            input.image.len(),
            input.language
        );

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", input.language, "tsv"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", self.binary))?;

        let mut stdin = child.stdin.take().context("tesseract stdin unavailable")?;
        let data = input.image.bytes.clone();
        let writer = tokio::spawn(async move {
            let written = stdin.write_all(&data).await;
            drop(stdin);
            written
        });

        debug!("TesseractEngine: image streamed, waiting for recognition");
        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for tesseract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tesseract exited with {}: {}", output.status, stderr.trim());
        }
        writer
            .await
            .context("tesseract stdin writer panicked")?
            .context("Failed to stream image to tesseract")?;

        let tsv = String::from_utf8_lossy(&output.stdout);
        let result = parse_tsv(&tsv)?;
        info!(
            "TesseractEngine: recognized {} chars (confidence {:.1})",
            result.text.len(),
            result.confidence
        );
        Ok(result)
    }
}

/// Rebuild plain text and mean word confidence from Tesseract TSV output.
///
/// Words on the same line are joined with spaces; a new paragraph or block
/// starts with a blank line.
pub fn parse_tsv(tsv: &str) -> anyhow::Result<OcrOutput> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .from_reader(tsv.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read tesseract TSV header")?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("tesseract TSV missing column '{}'", name))
    };
    let level_col = column("level")?;
    let page_col = column("page_num")?;
    let block_col = column("block_num")?;
    let par_col = column("par_num")?;
    let line_col = column("line_num")?;
    let conf_col = column("conf")?;
    let text_col = column("text")?;

    let mut text = String::new();
    let mut current_line: Option<[u32; 4]> = None;
    let mut conf_sum = 0.0;
    let mut conf_words = 0u32;

    for record in reader.records() {
        let record = record.context("Failed to read tesseract TSV row")?;
        let num = |idx: usize| -> u32 {
            record
                .get(idx)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0)
        };

        if num(level_col) != WORD_LEVEL {
            continue;
        }
        let word = record.get(text_col).unwrap_or("").trim();
        if word.is_empty() {
            continue;
        }

        let key = [num(page_col), num(block_col), num(par_col), num(line_col)];
        match current_line {
            Some(prev) if prev == key => text.push(' '),
            Some(prev) if prev[..3] == key[..3] => text.push('\n'),
            Some(_) => text.push_str("\n\n"),
            None => {}
        }
        current_line = Some(key);
        text.push_str(word);

        let conf: f64 = record
            .get(conf_col)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(-1.0);
        if conf >= 0.0 {
            conf_sum += conf;
            conf_words += 1;
        }
    }

    let confidence = if conf_words == 0 {
        0.0
    } else {
        conf_sum / f64::from(conf_words)
    };

    Ok(OcrOutput { text, confidence })
}
