use chrono::NaiveDate;

use crate::models::mood_entry::LOW_MOOD_MAX;

use super::evaluate::AlertReason;

/// Rendered alert, ready for dispatch to one contact.
#[derive(Debug, Clone)]
pub struct AlertEmail {
    pub subject: String,
    pub html: String,
}

/// Human label for a recorded low value, e.g. "baixo (2)".
fn mood_label(value: i32) -> String {
    if value <= 1 {
        format!("muito baixo ({})", value)
    } else {
        format!("baixo ({})", value)
    }
}

/// Render the well-being alert sent to one contact. All copy is pt-BR, the
/// product's locale; dates are formatted dd/MM/yyyy.
pub fn render_alert(
    contact_name: &str,
    user_name: &str,
    reason: AlertReason,
    mood_value: Option<i32>,
    reference_date: NaiveDate,
) -> AlertEmail {
    let date_br = reference_date.format("%d/%m/%Y");

    let reason_line = match reason {
        AlertReason::NoEntryRecorded => {
            format!("{} não registrou seu humor em {}.", user_name, date_br)
        }
        AlertReason::LowMoodRecorded => format!(
            "{} registrou um humor {} em {}.",
            user_name,
            mood_label(mood_value.unwrap_or(LOW_MOOD_MAX)),
            date_br
        ),
    };

    let greeting = {
        let trimmed = contact_name.trim();
        if trimmed.is_empty() {
            "Familiar"
        } else {
            trimmed
        }
    };

    let mood_note = mood_value
        .map(|v| {
            format!(
                "<p>Humor registrado: {} (numa escala de 1 a 5, sendo 1 o mais baixo).</p>",
                v
            )
        })
        .unwrap_or_default();

    AlertEmail {
        subject: format!("Atualização sobre o bem-estar de {}", user_name),
        html: format!(
            "<p>Olá {greeting},</p>\
             <p>Este é um contato do app Equilibrius.</p>\
             <p>{reason_line}</p>\
             {mood_note}\
             <p>Sugerimos que você entre em contato para oferecer seu apoio.</p>\
             <br>\
             <p>Atenciosamente,</p>\
             <p>Equipe Equilibrius</p>"
        ),
    }
}
