//! Dispatcher against a recording transport
//!
//! Run with: cargo test -p bot --test dispatcher

mod common;

use chrono::Duration;
use common::*;
use predictor::{GameId, MessageHandle, ShutdownManager};
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;

#[tokio::test]
async fn prediction_is_posted_then_edited() {
    let mut h = harness(&config());

    h.dispatcher
        .handle_update(channel_post(1, SOURCE, "#n100 ✅3(10♦️ 4♣️) - 2(J♥️ 8♠️)", false))
        .await;
    assert_eq!(h.sender.messages_to(PREDICTIONS), vec!["🔵102🔵:♠️statut :⏳"]);
    let handle = h.engine.lock().store().handle_for(GameId(102)).unwrap();

    h.dispatcher
        .handle_update(channel_post(2, SOURCE, "#n102 ✅1(♠️A 7♦️) - 6(Q♣️ 6♥️)", true))
        .await;
    assert_eq!(h.sender.edits(), vec![(handle, "🔵102🔵:♠️statut :✅0️⃣".to_string())]);
}

#[tokio::test]
async fn other_chats_do_not_feed_the_engine() {
    let mut h = harness(&config());

    h.dispatcher
        .handle_update(channel_post(1, -100777, "#n100 ✅(10♦️)", false))
        .await;
    h.dispatcher
        .handle_update(group_message(2, -100888, 7, "#n100 ✅(10♦️)"))
        .await;

    assert!(h.sender.sent.lock().is_empty());
    assert_eq!(h.engine.lock().summary().pending, 0);
}

#[tokio::test]
async fn feed_posts_forwarded_to_discussion_group_count_as_source() {
    let mut h = harness(&config());

    h.dispatcher
        .handle_update(forwarded_post(1, -100888, SOURCE, "#n100 ✅(10♦️)"))
        .await;

    assert_eq!(h.sender.messages_to(PREDICTIONS), vec!["🔵102🔵:♠️statut :⏳"]);
    assert!(h.sender.messages_to(-100888).is_empty());
}

#[tokio::test]
async fn redelivered_update_is_dropped() {
    let config = {
        let mut c = config();
        c.engine.cooldown_secs = 0;
        c
    };
    let mut h = harness(&config);

    h.dispatcher.handle_update(channel_post(1, SOURCE, "#n100 ✅(10♦️)", false)).await;
    h.dispatcher.handle_update(channel_post(2, SOURCE, "#n101 ✅(9♦️)", false)).await;
    // #n103 settles 102 at +1; delivered twice it must not also settle 103
    h.dispatcher.handle_update(channel_post(3, SOURCE, "#n103 ✅(A♠️)", false)).await;
    h.dispatcher.handle_update(channel_post(3, SOURCE, "#n103 ✅(A♠️)", false)).await;

    assert_eq!(h.sender.edits().len(), 1);
    assert!(h.engine.lock().store().has_pending(GameId(103)));
}

#[tokio::test]
async fn failed_announcement_skips_the_edit() {
    let mut h = harness(&config());
    h.sender.fail_sends.store(true, Ordering::SeqCst);

    h.dispatcher.handle_update(channel_post(1, SOURCE, "#n100 ✅(10♦️)", false)).await;
    h.sender.fail_sends.store(false, Ordering::SeqCst);
    h.dispatcher.handle_update(channel_post(2, SOURCE, "#n102 ✅(A♠️)", false)).await;

    assert!(h.sender.edits().is_empty());
    let engine = h.engine.lock();
    let record = engine.store().get(GameId(102)).unwrap();
    assert!(!record.is_pending());
}

#[tokio::test]
async fn admin_sets_cooldown() {
    let mut h = harness(&config());

    h.dispatcher.handle_update(private_message(1, ADMIN, "/cooldown 60")).await;
    assert_eq!(h.engine.lock().cooldown(), Duration::seconds(60));
    assert_eq!(h.sender.messages_to(ADMIN), vec!["✅ Cooldown mis à jour : 60s"]);

    h.dispatcher.handle_update(private_message(2, ADMIN, "/cooldown 99999")).await;
    assert_eq!(h.engine.lock().cooldown(), Duration::seconds(60));
    assert!(h.sender.messages_to(ADMIN)[1].contains("entre 0 et 3600"));
}

#[tokio::test]
async fn strangers_are_refused() {
    let mut h = harness(&config());

    h.dispatcher.handle_update(private_message(1, 7, "/reset")).await;
    h.dispatcher.handle_update(group_message(2, -100888, 7, "/cooldown 1")).await;

    assert_eq!(h.sender.messages_to(7), vec![bot::messages::UNAUTHORIZED]);
    assert!(h.sender.messages_to(-100888).is_empty());
    assert_eq!(h.engine.lock().cooldown(), Duration::seconds(300));
}

#[tokio::test]
async fn debug_mode_authorizes_everyone() {
    let mut config = config();
    config.debug_mode = true;
    let mut h = harness(&config);

    h.dispatcher.handle_update(private_message(1, 7, "/cooldown 10")).await;
    assert_eq!(h.engine.lock().cooldown(), Duration::seconds(10));
}

#[tokio::test]
async fn redi_sends_predictions_to_the_current_chat() {
    let mut h = harness(&config());

    h.dispatcher.handle_update(group_message(1, -100555, ADMIN, "/redi@pred_bot")).await;
    h.dispatcher.handle_update(channel_post(2, SOURCE, "#n100 ✅(10♦️)", false)).await;

    let texts = h.sender.messages_to(-100555);
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[1], "🔵102🔵:♠️statut :⏳");
    assert!(h.sender.messages_to(PREDICTIONS).is_empty());
}

#[tokio::test]
async fn redirect_commands() {
    let mut h = harness(&config());

    h.dispatcher
        .handle_update(private_message(1, ADMIN, "/redirect -1002682552255 -100999"))
        .await;
    assert_eq!(h.engine.lock().redirects().get(SOURCE), -100999);

    h.dispatcher.handle_update(private_message(2, ADMIN, "/redirect")).await;
    assert!(h.sender.messages_to(ADMIN)[1].contains("-1002682552255 → -100999"));

    h.dispatcher.handle_update(private_message(3, ADMIN, "/redirect clear")).await;
    assert_eq!(h.engine.lock().redirects().get(SOURCE), PREDICTIONS);
}

#[tokio::test]
async fn commands_for_other_bots_are_ignored() {
    let mut h = harness(&config());
    h.dispatcher.handle_update(group_message(1, -100555, ADMIN, "/reset@other_bot")).await;
    assert!(h.sender.sent.lock().is_empty());
}

#[tokio::test]
async fn unknown_command_gets_usage_hint() {
    let mut h = harness(&config());
    h.dispatcher.handle_update(private_message(1, ADMIN, "/deploy")).await;
    assert!(h.sender.messages_to(ADMIN)[0].contains("/deploy"));
}

/// Tags outside what Telegram's HTML mode accepts in our replies
fn unsupported_tags(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else { break };
        let tag = &rest[start + 1..start + len];
        let name = tag.trim_start_matches('/');
        if !matches!(name, "b" | "i" | "code") {
            found.push(tag.to_string());
        }
        rest = &rest[start + len + 1..];
    }
    found
}

#[tokio::test]
async fn replies_are_valid_html() {
    let mut h = harness(&config());
    let commands = [
        "/start", "/help", "/about", "/dev", "/cooldown", "/cooldown soon",
        "/redirect a", "/redirect list", "/announce", "/pred", "/deploy <now>",
    ];
    for (i, command) in commands.iter().enumerate() {
        h.dispatcher.handle_update(private_message(i as i64 + 1, ADMIN, command)).await;
    }

    let replies = h.sender.messages_to(ADMIN);
    assert_eq!(replies.len(), commands.len());
    for reply in &replies {
        assert!(unsupported_tags(reply).is_empty(), "unsupported tag in {reply:?}");
    }
    assert!(replies[6].contains("&lt;source&gt; &lt;cible&gt;"));
    assert!(replies[8].contains("&lt;message&gt;"));
}

#[tokio::test]
async fn reset_keeps_redirects() {
    let mut h = harness(&config());
    h.dispatcher.handle_update(private_message(1, ADMIN, "/redirect -1002682552255 -100999")).await;
    h.dispatcher.handle_update(channel_post(2, SOURCE, "#n100 ✅(10♦️)", false)).await;

    h.dispatcher.handle_update(private_message(3, ADMIN, "/reset")).await;

    let engine = h.engine.lock();
    assert_eq!(engine.summary().pending, 0);
    assert_eq!(engine.store().handle_for(GameId(102)), None);
    assert_eq!(engine.redirects().get(SOURCE), -100999);
}

#[tokio::test]
async fn announce_goes_to_default_destination() {
    let mut h = harness(&config());
    h.dispatcher
        .handle_update(private_message(1, ADMIN, "/announce Session ce soir"))
        .await;

    let posted = h.sender.messages_to(PREDICTIONS);
    assert_eq!(posted.len(), 1);
    assert!(posted[0].ends_with("Session ce soir"));
    assert_eq!(h.sender.messages_to(ADMIN), vec![bot::messages::ANNOUNCE_SENT]);
}

#[tokio::test]
async fn pred_lists_pending_predictions() {
    let mut h = harness(&config());
    h.dispatcher.handle_update(channel_post(1, SOURCE, "#n100 ✅(10♦️)", false)).await;
    h.dispatcher.handle_update(private_message(2, ADMIN, "/pred")).await;

    let reply = &h.sender.messages_to(ADMIN)[0];
    assert!(reply.contains("En attente : 1"));
    assert!(reply.contains("#102 → ♠️"));
}

#[tokio::test]
async fn private_flood_is_rate_limited() {
    let mut h = harness(&config());

    for i in 0..30 {
        h.dispatcher.handle_update(private_message(i, 7, "bonjour")).await;
    }
    assert!(h.sender.messages_to(7).is_empty());

    h.dispatcher.handle_update(private_message(30, 7, "bonjour")).await;
    h.dispatcher.handle_update(private_message(31, 7, "/start")).await;
    assert_eq!(h.sender.messages_to(7), vec![bot::messages::RATE_LIMITED]);

    h.clock.advance(Duration::seconds(61));
    h.dispatcher.handle_update(private_message(32, 7, "/start")).await;
    assert_eq!(h.sender.messages_to(7).len(), 2);
}

#[tokio::test]
async fn run_drains_queue_on_shutdown() {
    let h = harness(&config());
    let (tx, rx) = mpsc::channel(8);
    let shutdown = ShutdownManager::new();

    tx.send(channel_post(1, SOURCE, "#n100 ✅(10♦️)", false)).await.unwrap();
    let task = tokio::spawn(h.dispatcher.run(rx, shutdown.clone()));
    tx.send(channel_post(2, SOURCE, "#n102 ✅(A♠️)", false)).await.unwrap();
    drop(tx);

    tokio::time::timeout(std::time::Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(h.sender.messages_to(PREDICTIONS).len(), 1);
    assert_eq!(
        h.sender.edits(),
        vec![(MessageHandle::new(PREDICTIONS, 1000), "🔵102🔵:♠️statut :✅0️⃣".to_string())]
    );
}
