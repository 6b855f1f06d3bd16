use crate::{config::Config, notifier::Notification};
use chrono::{DateTime, Utc};
use lettre::{
    AsyncTransport, Message,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
};
use models::schemas::tournament::TournamentSchema;

pub async fn send_email(
    config: &Config,
    to: &str,
    subject: &str,
    html_body: &str,
    text_body: &str,
) -> Result<(), anyhow::Error> {
    let email = Message::builder()
        .from(Mailbox::new(
            Some("Tourney Team".to_string()),
            config.emailer.parse()?,
        ))
        .to(Mailbox::new(None, to.parse()?))
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text_body.to_string()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html_body.to_string()),
                ),
        )?;

    config
        .transponder
        .send(email)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send email: {}", e))?;
    Ok(())
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_start(start: DateTime<Utc>) -> String {
    start.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// The "starting soon" notice sent to a tournament's host.
pub fn render_starting_soon(tournament: &TournamentSchema, minutes_left: i64) -> Notification {
    let subject = format!("⏰ {} starts in {} minutes", tournament.title, minutes_left);
    let start = format_start(tournament.start_time);

    let html_body = format!(
        r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <meta name="viewport" content="width=device-width, initial-scale=1.0">
            <title>Tournament Starting Soon</title>
            <style>
                body {{
                    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
                    line-height: 1.6;
                    color: #333;
                    max-width: 600px;
                    margin: 0 auto;
                    padding: 20px;
                    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
                }}
                .email-container {{
                    background: white;
                    border-radius: 12px;
                    padding: 40px;
                    box-shadow: 0 10px 30px rgba(0,0,0,0.1);
                }}
                .title {{
                    font-size: 24px;
                    color: #2d3748;
                    text-align: center;
                }}
                .start-section {{
                    background: #f7fafc;
                    border: 2px dashed #e2e8f0;
                    border-radius: 8px;
                    padding: 20px;
                    text-align: center;
                    margin: 30px 0;
                }}
                .start-time {{
                    font-size: 22px;
                    font-weight: bold;
                    color: #667eea;
                }}
                .footer {{
                    text-align: center;
                    margin-top: 30px;
                    padding-top: 20px;
                    border-top: 1px solid #e2e8f0;
                    color: #718096;
                    font-size: 14px;
                }}
            </style>
        </head>
        <body>
            <div class="email-container">
                <h1 class="title">{title} starts in {minutes} minutes</h1>

                <div class="start-section">
                    <div class="start-time">{start}</div>
                </div>

                <p>Your players will be arriving shortly. Make sure everything is ready before the start.</p>

                <div class="footer">
                    <p>You are receiving this because you host this tournament.</p>
                </div>
            </div>
        </body>
        </html>
        "#,
        title = escape_html(&tournament.title),
        minutes = minutes_left,
        start = start,
    );

    let text_body = format!(
        r#"
{title} starts in {minutes} minutes

Scheduled start: {start}

Your players will be arriving shortly. Make sure everything is ready before the start.

You are receiving this because you host this tournament.
        "#,
        title = tournament.title,
        minutes = minutes_left,
        start = start,
    );

    Notification {
        subject,
        text_body,
        html_body,
    }
}
