//! Push display and notification click handling.

mod common;

use std::sync::atomic::Ordering;

use cdb_offline::{
    AgentError, DisplayedNotification, HostError, NotificationClickEvent, NotificationData,
    NotificationId, NotificationOptions, PushEvent, Trigger, TriggerOutcome,
};
use common::*;

fn displayed(id: u64, url: Option<&str>) -> DisplayedNotification {
    DisplayedNotification {
        id: NotificationId(id),
        title: "Coup de Bordure".to_string(),
        data: url.map(|url| NotificationData {
            url: url.to_string(),
        }),
    }
}

/// The click the host reports for a notification it displayed.
fn click_on(shown: &(NotificationId, String, NotificationOptions)) -> NotificationClickEvent {
    let (id, title, options) = shown;
    NotificationClickEvent::new(DisplayedNotification {
        id: *id,
        title: title.clone(),
        data: Some(options.data.clone()),
    })
}

#[tokio::test]
async fn empty_push_shows_defaults_and_opens_dashboard() {
    let agent = active_agent().await;

    let outcome = agent
        .dispatch(Trigger::Push(PushEvent::empty()))
        .await
        .unwrap();
    let TriggerOutcome::NotificationShown(intent) = outcome else {
        panic!("unexpected {outcome:?}");
    };
    assert_eq!(intent.title, "Coup de Bordure");
    assert_eq!(intent.options.body, "Notification");
    assert_eq!(intent.options.icon, "/static/pwa/icon-192.png");
    assert_eq!(intent.options.badge, "/static/pwa/icon-192.png");
    assert_eq!(intent.target_url(), "/dashboard/");

    let shown = agent.notifications().shown();
    assert_eq!(shown.len(), 1);
    let (id, title, options) = &shown[0];
    assert_eq!(title, "Coup de Bordure");
    assert_eq!(options, &intent.options);

    let click = click_on(&shown[0]);
    let outcome = agent
        .dispatch(Trigger::NotificationClick(click))
        .await
        .unwrap();
    assert_eq!(outcome, TriggerOutcome::WindowOpened("/dashboard/".to_string()));
    assert_eq!(agent.clients().opened(), vec!["/dashboard/".to_string()]);
    assert_eq!(*agent.notifications().closed.lock().unwrap(), vec![*id]);
}

#[tokio::test]
async fn partial_payload_fills_missing_fields() {
    let agent = active_agent().await;

    let intent = agent
        .push(&PushEvent::with_text(r#"{"title":"T","url":"/x"}"#))
        .await
        .unwrap();
    assert_eq!(intent.title, "T");
    assert_eq!(intent.options.body, "Notification");
    assert_eq!(intent.target_url(), "/x");

    let shown = agent.notifications().shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].2.data.url, "/x");

    let opened = agent.notification_click(&click_on(&shown[0])).await.unwrap();
    assert_eq!(opened, "/x");
    assert_eq!(agent.clients().opened(), vec!["/x".to_string()]);
}

#[tokio::test]
async fn malformed_payloads_fall_back_to_defaults() {
    let agent = active_agent().await;

    for raw in ["not json", "[1,2]", "42", r#"{"title":7,"body":""}"#] {
        let intent = agent.push(&PushEvent::with_text(raw)).await.unwrap();
        assert_eq!(intent.title, "Coup de Bordure", "payload {raw}");
        assert_eq!(intent.options.body, "Notification", "payload {raw}");
        assert_eq!(intent.target_url(), "/dashboard/", "payload {raw}");
    }
    assert_eq!(agent.notifications().shown().len(), 4);
}

#[tokio::test]
async fn click_without_url_opens_dashboard() {
    let agent = active_agent().await;

    for notification in [displayed(3, None), displayed(4, Some(""))] {
        let opened = agent
            .notification_click(&NotificationClickEvent::new(notification))
            .await
            .unwrap();
        assert_eq!(opened, "/dashboard/");
    }
    assert_eq!(
        *agent.notifications().closed.lock().unwrap(),
        vec![NotificationId(3), NotificationId(4)]
    );
}

#[tokio::test]
async fn denied_permission_fails_the_push() {
    let agent = active_agent().await;
    agent.notifications().denied.store(true, Ordering::SeqCst);

    let err = agent.push(&PushEvent::empty()).await.unwrap_err();
    assert_eq!(err, AgentError::Notification(HostError::PermissionDenied));
    assert!(agent.notifications().shown().is_empty());
}

#[tokio::test]
async fn concurrent_pushes_each_show_one_notification() {
    let agent = active_agent().await;

    let (first, second) = tokio::join!(
        agent.dispatch(Trigger::Push(PushEvent::with_text(r#"{"title":"A"}"#))),
        agent.dispatch(Trigger::Push(PushEvent::with_text(r#"{"title":"B"}"#))),
    );
    assert!(first.is_ok());
    assert!(second.is_ok());

    let mut titles: Vec<String> = agent
        .notifications()
        .shown()
        .into_iter()
        .map(|(_, title, _)| title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["A".to_string(), "B".to_string()]);
}
