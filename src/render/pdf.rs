//! PDF transcripts rendered from HTML templates with wkhtmltopdf.

use super::format_clock;
use crate::catalog::LectureRecord;
use crate::config::{PdfSettings, Templates};
use crate::error::{HoersaalError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Renders a transcription into a PDF document.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Render `transcription` as PDF bytes.
    ///
    /// With `metadata` the document opens with the lecture's details; without
    /// it only `fallback_title` is shown. `page_numbers` adds a
    /// `<page> / <total>` footer.
    async fn render_pdf(
        &self,
        metadata: Option<&LectureRecord>,
        fallback_title: &str,
        transcription: &str,
        page_numbers: bool,
    ) -> Result<Vec<u8>>;
}

/// Format a length in milliseconds as `H:MM:SS`.
pub fn format_duration(millis: u64) -> String {
    format_clock((millis / 1000) as f64)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn transcription_html(transcription: &str) -> String {
    transcription
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| format!("<p>{}</p>", escape_html(l)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fill the lecture or plain template for one transcription.
pub fn build_pdf_html(
    templates: &Templates,
    metadata: Option<&LectureRecord>,
    fallback_title: &str,
    transcription: &str,
) -> String {
    let mut vars = HashMap::new();
    vars.insert("transcription".to_string(), transcription_html(transcription));

    let template = match metadata {
        Some(record) => {
            vars.insert("title".to_string(), escape_html(&record.title));
            vars.insert("author".to_string(), escape_html(&record.author));
            vars.insert(
                "contributors".to_string(),
                escape_html(record.contributors.as_deref().unwrap_or("-")),
            );
            vars.insert("duration".to_string(), format_duration(record.duration_millis));
            vars.insert(
                "recorded_at".to_string(),
                record.recorded_at.format("%d.%m.%Y %H:%M").to_string(),
            );
            vars.insert("series_title".to_string(), escape_html(&record.series_title));
            vars.insert("link".to_string(), escape_html(&record.video_link));
            &templates.lecture
        }
        None => {
            vars.insert("title".to_string(), escape_html(fallback_title));
            &templates.plain
        }
    };

    Templates::render(template, &vars)
}

/// PDF renderer piping HTML through the `wkhtmltopdf` executable.
pub struct WkhtmltopdfRenderer {
    binary: String,
    page_size: String,
    margin_mm: u32,
    templates: Templates,
}

impl WkhtmltopdfRenderer {
    pub fn new(settings: &PdfSettings, templates: Templates) -> Self {
        Self {
            binary: settings.wkhtmltopdf_binary.clone(),
            page_size: settings.page_size.clone(),
            margin_mm: settings.margin_mm,
            templates,
        }
    }

    fn build_args(&self, page_numbers: bool) -> Vec<String> {
        let margin = format!("{}mm", self.margin_mm);
        let mut args = vec![
            "--quiet".to_string(),
            "--encoding".to_string(),
            "UTF-8".to_string(),
            "--page-size".to_string(),
            self.page_size.clone(),
        ];
        for side in ["top", "right", "bottom", "left"] {
            args.push(format!("--margin-{side}"));
            args.push(margin.clone());
        }
        if page_numbers {
            args.push("--footer-right".to_string());
            args.push("[page] / [topage]".to_string());
        }
        // Read HTML from stdin, write PDF to stdout
        args.push("-".to_string());
        args.push("-".to_string());
        args
    }
}

#[async_trait]
impl PdfRenderer for WkhtmltopdfRenderer {
    #[instrument(skip(self, metadata, transcription), fields(title = %fallback_title))]
    async fn render_pdf(
        &self,
        metadata: Option<&LectureRecord>,
        fallback_title: &str,
        transcription: &str,
        page_numbers: bool,
    ) -> Result<Vec<u8>> {
        let html = build_pdf_html(&self.templates, metadata, fallback_title, transcription);
        debug!("Rendering {} bytes of HTML", html.len());

        let spawned = Command::new(&self.binary)
            .args(self.build_args(page_numbers))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HoersaalError::ToolNotFound(self.binary.clone()));
            }
            Err(e) => {
                return Err(HoersaalError::Render(format!("wkhtmltopdf execution failed: {e}")));
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(html.as_bytes()).await?;
            // Dropping stdin closes the pipe so wkhtmltopdf starts rendering
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HoersaalError::Render(format!("wkhtmltopdf failed: {}", stderr.trim())));
        }
        if output.stdout.is_empty() {
            return Err(HoersaalError::Render("wkhtmltopdf produced no output".into()));
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn lecture() -> LectureRecord {
        LectureRecord {
            title: "Graphen & Bäume".to_string(),
            author: "Doe, Jane".to_string(),
            contributors: None,
            series_title: "Algorithmen <VU>".to_string(),
            duration_millis: 5_423_412,
            recorded_at: DateTime::parse_from_rfc3339("2022-12-20T09:15:00+01:00").unwrap(),
            video_link: "https://media.example.org/v.mp4?a=1&b=2".to_string(),
            audio_link: None,
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5_423_412), "1:30:23");
        assert_eq!(format_duration(999), "0:00:00");
    }

    #[test]
    fn test_lecture_page_has_metadata() {
        let html = build_pdf_html(&Templates::default(), Some(&lecture()), "ignored", "Erste Zeile\nZweite <Zeile>");

        assert!(html.contains("<h1>Graphen &amp; Bäume</h1>"));
        assert!(html.contains("<td>Doe, Jane</td>"));
        assert!(html.contains("<td>-</td>"));
        assert!(html.contains("<td>1:30:23</td>"));
        assert!(html.contains("<td>20.12.2022 09:15</td>"));
        assert!(html.contains("Algorithmen &lt;VU&gt;"));
        assert!(html.contains("https://media.example.org/v.mp4?a=1&amp;b=2"));
        assert!(html.contains("<p>Erste Zeile</p>\n<p>Zweite &lt;Zeile&gt;</p>"));
        assert!(!html.contains("ignored"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_plain_page_uses_fallback_title() {
        let html = build_pdf_html(&Templates::default(), None, "aufnahme_03", "Hallo");

        assert!(html.contains("<h1>aufnahme_03</h1>"));
        assert!(html.contains("<p>Hallo</p>"));
        assert!(!html.contains("Autor"));
    }

    #[test]
    fn test_transcription_with_placeholder_syntax_is_kept() {
        for _ in 0..20 {
            let html = build_pdf_html(&Templates::default(), None, "aufnahme", "Syntax: {{title}} and {{link}}");
            assert!(html.contains("<h1>aufnahme</h1>"));
            assert!(html.contains("<p>Syntax: {{title}} and {{link}}</p>"));
        }

        let html = build_pdf_html(&Templates::default(), Some(&lecture()), "ignored", "{{link}} {{author}}");
        assert!(html.contains("<p>{{link}} {{author}}</p>"));
    }

    #[test]
    fn test_args_with_page_numbers() {
        let renderer = WkhtmltopdfRenderer::new(&PdfSettings::default(), Templates::default());
        let args = renderer.build_args(true);

        assert!(args.windows(2).any(|w| w == ["--page-size", "A4"]));
        assert!(args.windows(2).any(|w| w == ["--margin-left", "15mm"]));
        assert!(args.windows(2).any(|w| w == ["--footer-right", "[page] / [topage]"]));
        assert_eq!(&args[args.len() - 2..], ["-", "-"]);
    }

    #[test]
    fn test_args_without_page_numbers() {
        let renderer = WkhtmltopdfRenderer::new(&PdfSettings::default(), Templates::default());
        assert!(!renderer.build_args(false).iter().any(|a| a == "--footer-right"));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let settings = PdfSettings {
            wkhtmltopdf_binary: "hoersaal-no-such-wkhtmltopdf".to_string(),
            ..PdfSettings::default()
        };
        let renderer = WkhtmltopdfRenderer::new(&settings, Templates::default());

        let result = renderer.render_pdf(None, "x", "y", false).await;
        assert!(matches!(result, Err(HoersaalError::ToolNotFound(_))));
    }
}
