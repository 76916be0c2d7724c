use chrono::{Duration, TimeZone, Utc};
use litemark_core::{
    filter_notes, summarize, tag_index, trash_listing, ManualClock, MemoryKvStore, Note,
    NoteListView, NotePatch, NoteService, TagBrowser, TagCount,
};

fn titles(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|note| note.title.as_str()).collect()
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Budget, Recipe and Journal, created one minute apart in that order.
fn populated_service() -> (NoteService<MemoryKvStore>, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    let mut service = NoteService::with_clock(MemoryKvStore::new(), Box::new(clock.clone()));

    for (title, content, note_tags) in [
        ("Budget", "rent and groceries", &["#finance"][..]),
        ("Recipe", "pasta with garlic", &["#food", "#home"][..]),
        ("Journal", "walked to the market", &["#home"][..]),
    ] {
        let note = service.create().unwrap();
        service
            .update(
                &note.id,
                NotePatch::new()
                    .title(title)
                    .content(content)
                    .tags(tags(note_tags)),
            )
            .unwrap();
        clock.advance(Duration::minutes(1));
    }
    (service, clock)
}

#[test]
fn search_matches_tags_case_insensitively() {
    let (service, _clock) = populated_service();
    let active = service.list_active();

    assert_eq!(titles(&filter_notes(&active, "fin")), vec!["Budget"]);
}

#[test]
fn search_matches_content_regardless_of_case() {
    let (service, _clock) = populated_service();
    let active = service.list_active();

    assert_eq!(titles(&filter_notes(&active, "PASTA")), vec!["Recipe"]);
    assert!(filter_notes(&active, "nothing like this").is_empty());
}

#[test]
fn blank_query_lists_everything_newest_first() {
    let (service, _clock) = populated_service();
    let active = service.list_active();

    assert_eq!(
        titles(&filter_notes(&active, "   ")),
        vec!["Journal", "Recipe", "Budget"]
    );
}

#[test]
fn editing_moves_note_to_top() {
    let (mut service, clock) = populated_service();
    let budget = service
        .list_active()
        .into_iter()
        .find(|note| note.title == "Budget")
        .unwrap();

    clock.advance(Duration::minutes(1));
    service
        .update(&budget.id, NotePatch::new().content("rent, groceries, fuel"))
        .unwrap();

    assert_eq!(
        titles(&filter_notes(&service.list_active(), "")),
        vec!["Budget", "Journal", "Recipe"]
    );
}

#[test]
fn list_view_keeps_query_between_projections() {
    let (service, _clock) = populated_service();
    let mut view = NoteListView::new();

    view.set_query("#home");
    assert_eq!(view.query(), "#home");
    assert_eq!(
        titles(&view.visible(&service.list_active())),
        vec!["Journal", "Recipe"]
    );

    view.clear_query();
    assert_eq!(view.visible(&service.list_active()).len(), 3);
}

#[test]
fn tag_index_counts_notes_per_tag() {
    let (service, _clock) = populated_service();

    let index = tag_index(&service.list_active());

    assert_eq!(
        index,
        vec![
            TagCount {
                tag: "#finance".to_string(),
                count: 1
            },
            TagCount {
                tag: "#food".to_string(),
                count: 1
            },
            TagCount {
                tag: "#home".to_string(),
                count: 2
            },
        ]
    );
}

#[test]
fn tag_browser_expands_one_tag_at_a_time() {
    let (service, _clock) = populated_service();
    let active = service.list_active();
    let mut browser = TagBrowser::new();

    assert!(browser.expanded_notes(&active).is_empty());

    browser.toggle("#home");
    assert_eq!(browser.expanded(), Some("#home"));
    assert_eq!(
        titles(&browser.expanded_notes(&active)),
        vec!["Journal", "Recipe"]
    );

    browser.toggle("#finance");
    assert_eq!(browser.expanded(), Some("#finance"));
    assert_eq!(titles(&browser.expanded_notes(&active)), vec!["Budget"]);

    browser.toggle("#finance");
    assert_eq!(browser.expanded(), None);

    browser.toggle("#food");
    browser.collapse();
    assert!(browser.expanded_notes(&active).is_empty());
}

#[test]
fn trash_listing_ignores_search_and_sorts_by_recency() {
    let (mut service, _clock) = populated_service();
    for note in service.list_active() {
        if note.title != "Journal" {
            service.soft_delete(&note.id).unwrap();
        }
    }

    let rows = trash_listing(&service.list_deleted());

    assert_eq!(titles(&rows), vec!["Recipe", "Budget"]);
    assert_eq!(titles(&service.list_active()), vec!["Journal"]);
}

#[test]
fn summaries_strip_markdown_for_previews() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let note = Note::with_id(
        "n1",
        "Links",
        "## See [docs](https://example.com) and ![shot](img/shot.png)",
        ts,
    );

    let summaries = summarize(&[note]);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, "n1");
    assert_eq!(summaries[0].title, "Links");
    assert_eq!(
        summaries[0].preview.preview_text.as_deref(),
        Some("See docs and")
    );
    assert_eq!(
        summaries[0].preview.preview_image.as_deref(),
        Some("img/shot.png")
    );
}
