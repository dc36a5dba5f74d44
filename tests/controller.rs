use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use character_sheet::model::{Attribute, CharacterSheet};
use character_sheet::{FetchError, GenerateOutcome, SheetController, SheetExporter, SheetSource};
use tokio::sync::oneshot;

type Reply = Result<CharacterSheet, FetchError>;

/// Source whose responses are released by the test through oneshot channels.
#[derive(Default)]
struct ScriptedSource {
    pending: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
}

impl ScriptedSource {
    fn expect_request(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().expect("pending lock").push_back(rx);
        tx
    }
}

#[async_trait]
impl SheetSource for ScriptedSource {
    async fn fetch(&self) -> Result<CharacterSheet, FetchError> {
        let rx = self
            .pending
            .lock()
            .expect("pending lock")
            .pop_front()
            .expect("unexpected request");
        rx.await
            .unwrap_or_else(|_| Err(FetchError::Network("script dropped".to_string())))
    }
}

fn generated(race: &str, class: &str) -> CharacterSheet {
    Attribute::ALL
        .iter()
        .enumerate()
        .fold(CharacterSheet::new(race, class), |sheet, (i, attribute)| {
            sheet.with_attribute(attribute.key(), 8 + i as i32, i as i32 - 1)
        })
}

#[tokio::test]
async fn successful_fetch_shows_six_attributes() {
    let source = Arc::new(ScriptedSource::default());
    let controller = SheetController::new(source.clone());
    source
        .expect_request()
        .send(Ok(generated("Elfo", "Guerreiro")))
        .expect("send reply");

    assert!(!controller.is_busy());
    assert!(controller.generate().await.is_applied());
    assert!(!controller.is_busy());

    let layout = controller.layout().expect("layout");
    let names: Vec<_> = layout
        .attribute_cells()
        .iter()
        .map(|cell| (cell.name.as_str(), cell.score, cell.modifier))
        .collect();
    assert_eq!(
        names,
        [
            ("Força", 8, Some(-1)),
            ("Destreza", 9, Some(0)),
            ("Constituição", 10, Some(1)),
            ("Inteligência", 11, Some(2)),
            ("Sabedoria", 12, Some(3)),
            ("Carisma", 13, Some(4)),
        ]
    );
}

#[tokio::test]
async fn network_failure_keeps_previous_sheet() {
    let source = Arc::new(ScriptedSource::default());
    let controller = SheetController::new(source.clone());

    source
        .expect_request()
        .send(Ok(generated("Anão", "Clérigo")))
        .expect("send reply");
    controller.generate().await;

    source
        .expect_request()
        .send(Err(FetchError::Network("connection reset".to_string())))
        .expect("send reply");
    let outcome = controller.generate().await;

    assert!(matches!(outcome, GenerateOutcome::Failed(FetchError::Network(_))));
    assert!(!controller.is_busy());
    assert_eq!(controller.sheet().expect("sheet").race(), "Anão");
}

#[tokio::test]
async fn failure_without_sheet_leaves_view_empty() {
    let source = Arc::new(ScriptedSource::default());
    let controller = SheetController::new(source.clone());
    source
        .expect_request()
        .send(Err(FetchError::Parse("expected value".to_string())))
        .expect("send reply");

    controller.generate().await;
    let view = controller.view();
    assert!(!view.busy);
    assert!(view.sheet.is_none());
    assert!(controller.layout().is_none());
}

#[tokio::test]
async fn busy_while_request_is_pending() {
    let source = Arc::new(ScriptedSource::default());
    let controller = Arc::new(SheetController::new(source.clone()));
    let reply = source.expect_request();

    let task = tokio::spawn({
        let controller = controller.clone();
        async move { controller.generate().await.is_applied() }
    });

    while !controller.is_busy() {
        tokio::task::yield_now().await;
    }
    reply
        .send(Ok(generated("Halfling", "Ladino")))
        .expect("send reply");

    assert!(task.await.expect("join"));
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn dropped_request_does_not_leave_the_view_busy() {
    let source = Arc::new(ScriptedSource::default());
    let controller = SheetController::new(source.clone());
    let _reply = source.expect_request();

    let timed_out = tokio::time::timeout(Duration::from_millis(20), controller.generate()).await;
    assert!(timed_out.is_err());
    assert!(!controller.is_busy());
    assert!(controller.sheet().is_none());
}

#[tokio::test]
async fn overlapping_requests_keep_the_last_invoked() {
    let source = Arc::new(ScriptedSource::default());
    let controller = SheetController::new(source.clone());
    let first = source.expect_request();
    let second = source.expect_request();

    let release = async {
        second
            .send(Ok(generated("Humano", "Paladino")))
            .expect("send second");
        tokio::task::yield_now().await;
        first
            .send(Ok(generated("Orc", "Bárbaro")))
            .expect("send first");
    };

    let (first_outcome, second_outcome, ()) =
        tokio::join!(controller.generate(), controller.generate(), release);

    assert!(matches!(first_outcome, GenerateOutcome::Superseded));
    assert!(second_outcome.is_applied());
    assert!(!controller.is_busy());
    assert_eq!(controller.sheet().expect("sheet").race(), "Humano");
}

#[tokio::test]
async fn export_is_a_no_op_without_a_sheet() {
    let controller = SheetController::new(Arc::new(ScriptedSource::default()));
    let dir = tempfile::tempdir().expect("tempdir");

    let exported = controller
        .export_to(&SheetExporter::default(), dir.path())
        .expect("no-op export");
    assert!(exported.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
}
