use slidedeck_core::{
    commands::{Command, CommandKind, PositionUpdate},
    document::{ElementKind, Position, Size},
    ids::*,
};
use slidedeck_engine::{Dispatched, EngineConfig, EngineError, HistoryFlags, TravelResult};
use slidedeck_harness::{RecordingObserver, TestEditor, init_tracing};

// ============================================================================
// Recording
// ============================================================================

#[test]
fn undo_and_redo_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let mut editor = TestEditor::new()?;
    let s1 = editor.slide(0);
    let before = editor.engine.document().clone();

    editor.add_text(s1)?;
    let after = editor.engine.document().clone();
    assert_ne!(before, after);
    assert!(editor.engine.can_undo());
    assert!(!editor.engine.can_redo());

    editor.engine.undo()?;
    assert_eq!(editor.engine.document(), &before);
    assert!(editor.engine.can_redo());

    editor.engine.redo()?;
    assert_eq!(editor.engine.document(), &after);
    Ok(())
}

#[test]
fn selection_commands_are_not_recorded() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::new()?;
    let s1 = editor.slide(0);
    let s2 = editor.slide(1);
    let e1 = editor.add_text(s1)?;
    assert_eq!(editor.engine.past().len(), 1);

    for command in [
        Command::SelectSlides(vec![s2]),
        Command::SelectSlides(vec![s1]),
        Command::SelectElements(vec![e1]),
        Command::ClearSelection,
    ] {
        assert_eq!(editor.dispatch(command)?, Dispatched::PassedThrough);
    }
    assert_eq!(editor.engine.past().len(), 1);
    assert!(editor.engine.future().is_empty());

    // Selection changes made after an edit do not stop it from being undone.
    editor.engine.undo()?;
    assert!(editor.engine.document().slides[0].elements.is_empty());
    Ok(())
}

#[test]
fn edits_that_change_nothing_are_not_recorded() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::new()?;
    let s1 = editor.slide(0);

    assert_eq!(editor.set_title("Deck")?, Dispatched::Unchanged);
    assert_eq!(
        editor.remove_elements(s1, vec![ElementId::new()])?,
        Dispatched::Unchanged
    );
    assert_eq!(
        editor.dispatch(Command::UpdateElementPosition {
            slide_id: SlideId::new(),
            element_id: ElementId::new(),
            position: Position::new(10.0, 10.0),
        })?,
        Dispatched::Unchanged
    );
    assert!(!editor.engine.can_undo());
    Ok(())
}

#[test]
fn recorded_edits_report_their_kind() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::new()?;
    assert_eq!(
        editor.set_title("Quarterly review")?,
        Dispatched::Recorded(CommandKind::ChangeTitle)
    );
    Ok(())
}

#[test]
fn invalid_geometry_is_rejected_before_recording() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::new()?;
    let s1 = editor.slide(0);
    let e1 = editor.add_text(s1)?;
    let before = editor.engine.document().clone();

    let result = editor.dispatch(Command::UpdateElementSize {
        slide_id: s1,
        element_id: e1,
        size: Size::new(-5.0, 40.0),
    });
    assert!(matches!(
        result,
        Err(EngineError::InvalidCommand {
            kind: "update_element_size",
            ..
        })
    ));
    assert_eq!(editor.engine.document(), &before);
    assert_eq!(editor.engine.past().len(), 1);
    Ok(())
}

#[test]
fn non_finite_position_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::new()?;
    let s1 = editor.slide(0);
    let e1 = editor.add_text(s1)?;

    let result = editor.dispatch(Command::UpdateElementPosition {
        slide_id: s1,
        element_id: e1,
        position: Position::new(f64::NAN, 20.0),
    });
    assert!(matches!(
        result,
        Err(EngineError::InvalidCommand {
            kind: "update_element_position",
            ..
        })
    ));
    let batch = editor.dispatch(Command::UpdateElementPositions {
        updates: vec![PositionUpdate {
            slide_id: s1,
            element_id: e1,
            position: Position::new(0.0, f64::INFINITY),
        }],
    });
    assert!(batch.is_err());
    assert_eq!(editor.engine.past().len(), 1);

    // The document still compares equal to itself, so no-op edits stay unrecorded.
    assert_eq!(editor.set_title("Deck")?, Dispatched::Unchanged);
    assert_eq!(editor.engine.past().len(), 1);
    Ok(())
}

// ============================================================================
// Time travel
// ============================================================================

#[test]
fn undo_and_redo_dispatch_as_commands() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::new()?;
    assert_eq!(
        editor.dispatch(Command::Undo)?,
        Dispatched::Travelled(TravelResult::Empty)
    );

    editor.set_title("Renamed")?;
    assert!(matches!(
        editor.dispatch(Command::Undo)?,
        Dispatched::Travelled(TravelResult::Applied(_))
    ));
    assert_eq!(editor.engine.document().title, "Deck");
    assert!(matches!(
        editor.dispatch(Command::Redo)?,
        Dispatched::Travelled(TravelResult::Applied(_))
    ));
    assert_eq!(editor.engine.document().title, "Renamed");
    assert_eq!(
        editor.dispatch(Command::Redo)?,
        Dispatched::Travelled(TravelResult::Empty)
    );
    Ok(())
}

#[test]
fn undo_and_redo_move_entries_between_stacks() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::new()?;
    let s1 = editor.slide(0);
    let initial = editor.engine.document().clone();

    editor.set_title("One")?;
    editor.add_text(s1)?;
    editor.add_slide()?;
    let latest = editor.engine.document().clone();

    for (past, future) in [(2, 1), (1, 2), (0, 3)] {
        editor.engine.undo()?;
        assert_eq!(editor.engine.past().len(), past);
        assert_eq!(editor.engine.future().len(), future);
    }
    assert_eq!(editor.engine.document(), &initial);
    assert_eq!(editor.engine.undo()?, TravelResult::Empty);

    for _ in 0..3 {
        editor.engine.redo()?;
    }
    assert_eq!(editor.engine.document(), &latest);
    assert_eq!(editor.engine.past().len(), 3);
    assert!(editor.engine.future().is_empty());
    Ok(())
}

#[test]
fn new_edit_discards_redo_branch() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::new()?;
    editor.set_title("A")?;
    editor.set_title("B")?;
    editor.engine.undo()?;
    assert!(editor.engine.can_redo());

    editor.set_title("C")?;
    assert!(!editor.engine.can_redo());
    assert_eq!(editor.engine.past().len(), 2);

    editor.engine.undo()?;
    assert_eq!(editor.engine.document().title, "A");
    editor.engine.undo()?;
    assert_eq!(editor.engine.document().title, "Deck");
    Ok(())
}

#[test]
fn snapshots_are_not_reached_by_later_edits() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::new()?;
    let s1 = editor.slide(0);
    let e1 = editor.add_text(s1)?;
    editor.dispatch(Command::UpdateTextContent {
        slide_id: s1,
        element_id: e1,
        text: "first".into(),
    })?;
    editor.dispatch(Command::UpdateTextContent {
        slide_id: s1,
        element_id: e1,
        text: "second".into(),
    })?;

    let recorded = &editor.engine.past()[2].snapshot;
    let text = recorded.slides()[0].element(e1).map(|e| e.kind.clone());
    assert!(matches!(
        text,
        Some(ElementKind::Text { ref content, .. }) if content == "first"
    ));
    Ok(())
}

// ============================================================================
// Bounds and clearing
// ============================================================================

#[test]
fn history_depth_evicts_oldest_entries() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::with_config(EngineConfig {
        max_history: 3,
        ..EngineConfig::default()
    })?;
    for i in 1..=5 {
        editor.set_title(&format!("t{i}"))?;
    }
    assert_eq!(editor.engine.past().len(), 3);

    while editor.engine.can_undo() {
        editor.engine.undo()?;
    }
    assert_eq!(editor.engine.document().title, "t2");
    Ok(())
}

#[test]
fn zero_depth_keeps_one_entry() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::with_config(EngineConfig {
        max_history: 0,
        ..EngineConfig::default()
    })?;
    editor.set_title("A")?;
    editor.set_title("B")?;
    assert_eq!(editor.engine.past().len(), 1);
    editor.engine.undo()?;
    assert_eq!(editor.engine.document().title, "A");
    Ok(())
}

#[test]
fn clear_history_empties_both_stacks() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::new()?;
    editor.set_title("A")?;
    editor.set_title("B")?;
    editor.engine.undo()?;

    editor.engine.clear_history();
    assert_eq!(editor.engine.flags(), HistoryFlags::default());
    assert_eq!(editor.engine.document().title, "A");
    assert_eq!(editor.engine.undo()?, TravelResult::Empty);
    Ok(())
}

// ============================================================================
// Observer
// ============================================================================

#[test]
fn observer_sees_flags_and_focus() -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = TestEditor::new()?;
    let s1 = editor.slide(0);
    let (observer, log) = RecordingObserver::new();
    editor.engine.set_observer(Box::new(observer));
    assert_eq!(log.borrow().last_flags(), Some(HistoryFlags::default()));

    let e1 = editor.add_text(s1)?;
    let flags = log.borrow().last_flags();
    assert_eq!(flags.map(|f| (f.can_undo, f.can_redo)), Some((true, false)));

    let s2 = editor.slide(1);
    editor.select_slide(s2)?;
    assert_eq!(log.borrow().flags.len(), 2);

    editor.engine.undo()?;
    let flags = log.borrow().last_flags();
    assert_eq!(flags.map(|f| (f.can_undo, f.can_redo)), Some((false, true)));
    assert_eq!(log.borrow().focus.len(), 1);
    assert_eq!(log.borrow().focus[0].slide_ids, vec![s1]);
    // The element is gone after undo, so only the slide is focused.
    assert!(log.borrow().focus[0].element_ids.is_empty());

    editor.engine.redo()?;
    assert_eq!(log.borrow().focus[1].element_ids, vec![e1]);
    Ok(())
}
