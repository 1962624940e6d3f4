//! Operator-facing texts (HTML parse mode)

use predictor::application::EngineSummary;
use predictor::{ChatId, PredictionRecord};

pub const WELCOME: &str = "🎭 <b>Bienvenue !</b> 🔮

Je surveille le canal des résultats et publie une prédiction de costume quand une carte signal apparaît.

<b>Commandes :</b>
/help - aide détaillée
/about - à propos du bot
/dev - informations développeur
/cooldown [secondes] - délai entre prédictions
/redirect [source] [cible] - redirection des prédictions
/redi - rediriger vers ce chat
/announce [message] - annonce officielle
/pred - état des prédictions
/reset - réinitialiser les prédictions";

pub const HELP: &str = "🎯 <b>Guide d'utilisation</b>

Le bot lit les messages #nXXX terminés (✅ ou 🔰) du canal source. Si le premier groupe entre parenthèses contient une carte signal, il prédit un costume pour le jeu XXX+2 et publie :
🔵102🔵:♠️statut :⏳

Le message est ensuite modifié :
✅0️⃣ / ✅1️⃣ - costume trouvé au jeu prévu ou au suivant
❌ - costume absent

<b>Configuration :</b>
/cooldown - afficher le délai
/cooldown 300 - délai de 300 secondes
/redirect -100123 -100456 - envoyer les prédictions de -100123 vers -100456
/redirect list - voir les redirections
/redirect clear - supprimer les redirections
/redi - envoyer les prédictions dans ce chat
/announce texte - publier une annonce
/reset - effacer toutes les prédictions

Cartes reconnues : ♠️ ♥️ ♦️ ♣️";

pub const ABOUT: &str = "🎭 <b>Bot Joker - Prédicteur de cartes</b>

🔮 Prédictions automatiques à partir des cartes signal
✅ Vérification sur les jeux suivants
🔀 Redirection multi-canaux";

pub const DEV: &str = "👨‍💻 <b>Informations développeur</b>

🦀 Rust, axum et l'API Telegram Bot
🔗 Réception des mises à jour par webhook

Pour le support technique, contactez l'administrateur du bot.";

pub const UNAUTHORIZED: &str = "🚫 Vous n'êtes pas autorisé à utiliser ce bot.";

pub const RATE_LIMITED: &str = "⏳ Trop de messages. Merci de patienter une minute.";

pub const RESET_DONE: &str = "🔄 Toutes les prédictions ont été réinitialisées.";

pub const REDIRECTS_CLEARED: &str = "🗑️ Toutes les redirections ont été supprimées.";

pub const ANNOUNCE_SENT: &str = "📢 Annonce publiée.";

pub const ANNOUNCE_FAILED: &str = "⚠️ Impossible de publier l'annonce.";

pub fn cooldown_status(current_secs: i64, remaining_secs: Option<i64>, min: u64, max: u64) -> String {
    let remaining = match remaining_secs {
        Some(secs) => format!("⏳ Prochaine prédiction possible dans {}s", secs),
        None => "✅ Prochaine prédiction possible maintenant".to_string(),
    };
    format!(
        "⏱️ Cooldown actuel : {}s\n{}\n\nUsage : /cooldown [secondes] ({} à {})",
        current_secs, remaining, min, max
    )
}

pub fn cooldown_updated(secs: u64) -> String {
    format!("✅ Cooldown mis à jour : {}s", secs)
}

pub fn cooldown_out_of_range(min: u64, max: u64) -> String {
    format!("❌ Le cooldown doit être compris entre {} et {} secondes.", min, max)
}

pub fn redirect_set(source: ChatId, destination: ChatId) -> String {
    format!("🔀 Prédictions de {} redirigées vers {}", source, destination)
}

pub fn redirect_list(default_destination: ChatId, routes: &[(ChatId, ChatId)]) -> String {
    let mut text = format!("🔀 <b>Redirections</b>\nPar défaut : {}", default_destination);
    if routes.is_empty() {
        text.push_str("\nAucune redirection active.");
    }
    for (source, destination) in routes {
        text.push_str(&format!("\n{} → {}", source, destination));
    }
    text
}

/// Escape text that is not markup so Telegram's HTML parser accepts it
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

/// `reason` may echo operator input and is escaped
pub fn usage_error(reason: &str) -> String {
    format!("❌ {}\n\nTapez /help pour l'aide.", escape_html(reason))
}

pub fn prediction_summary<'a, I>(summary: &EngineSummary, records: I) -> String
where
    I: IntoIterator<Item = &'a PredictionRecord>,
{
    let mut text = format!(
        "📊 <b>Prédictions</b>\n⏳ En attente : {}\n✅ Réussies : {}\n❌ Échouées : {}",
        summary.pending, summary.correct, summary.failed
    );

    let pending: Vec<_> = records.into_iter().filter(|r| r.is_pending()).collect();
    if !pending.is_empty() {
        text.push('\n');
        for record in pending {
            text.push_str(&format!(
                "\n#{} → {} (signal {} au jeu #{})",
                record.target_game_id, record.predicted_outcome, record.signal, record.source_game_id
            ));
        }
    }

    text
}
