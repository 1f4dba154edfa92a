//! Pager layout and pager/table coordination through a page.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_tabula::{
    Column, DataOwner, DataPager, Page, PagedTable, RequestContext, TabulaConfig, Value, binder_fn,
};

fn rows(total: usize) -> Vec<Value> {
    (1..=total).map(|i| Value::map([("n", i)])).collect()
}

/// Button labels of a drawn pager, `...` standing for an ellipsis.
fn buttons(html: &str) -> Vec<String> {
    html.split("<button")
        .skip(1)
        .map(|button| {
            let open = button.find('>').unwrap();
            let close = button.find("</button>").unwrap();
            match &button[open + 1..close] {
                "&hellip;" => "...".to_string(),
                label => label.to_string(),
            }
        })
        .collect()
}

fn pager_page(total: usize, page_num: usize) -> Page {
    let config = TabulaConfig::default();
    let mut page = Page::new("report", config.clone());
    let mut table = PagedTable::new("people", &config);
    table.set_data(rows(total));
    table.set_page_num(page_num);
    page.add_control(table).unwrap();
    page.add_control(DataPager::new("pager", "people", &config)).unwrap();
    page
}

#[test]
fn test_bunch_in_the_middle() {
    let mut page = pager_page(1000, 50);
    let html = page.draw_control(&RequestContext::new(), "pager").unwrap();
    assert_eq!(
        buttons(&html),
        [
            "Previous", "1", "...", "48", "49", "50", "51", "52", "53", "...", "100", "Next"
        ]
    );
}

#[test]
fn test_bunch_at_the_left_edge() {
    let mut page = pager_page(1000, 3);
    let html = page.draw_control(&RequestContext::new(), "pager").unwrap();
    assert_eq!(
        buttons(&html),
        [
            "Previous", "1", "2", "3", "4", "5", "6", "7", "8", "...", "100", "Next"
        ]
    );
    assert!(!html.contains("class=\"gr-prev\" disabled"));
}

#[test]
fn test_bunch_at_the_right_edge() {
    let mut page = pager_page(1000, 100);
    let html = page.draw_control(&RequestContext::new(), "pager").unwrap();
    assert_eq!(
        buttons(&html),
        [
            "Previous", "1", "...", "93", "94", "95", "96", "97", "98", "99", "100", "Next"
        ]
    );
    assert!(html.contains("class=\"gr-next\" disabled"));
}

#[test]
fn test_pager_drawn_before_table_loads_its_data() {
    let config = TabulaConfig::default().with_default_page_size(4);
    let mut page = Page::new("report", config.clone());
    let binds = Arc::new(AtomicUsize::new(0));
    let counter = binds.clone();
    page.add_binder(
        "numbers",
        binder_fn(move |_request, owner: &mut dyn DataOwner| {
            counter.fetch_add(1, Ordering::SeqCst);
            owner.set_paged_rows(rows(10));
            Ok(())
        }),
    );

    let mut table = PagedTable::new("people", &config);
    table.add_column(Column::key("n", "N")).unwrap();
    table.set_data_provider("numbers");
    page.add_control(table).unwrap();
    page.add_control(DataPager::new("pager", "people", &config)).unwrap();

    let parts = page
        .draw_controls(&RequestContext::new(), &["pager", "people"])
        .unwrap();
    assert_eq!(buttons(&parts[0]), ["Previous", "1", "2", "3", "Next"]);
    assert!(parts[1].contains(
        "<tbody><tr><td>1</td></tr><tr><td>2</td></tr><tr><td>3</td></tr><tr><td>4</td></tr></tbody>"
    ));
    assert_eq!(binds.load(Ordering::SeqCst), 1);

    // Page click to page 3 redraws the table and its pager.
    let click = page
        .control::<DataPager>("pager")
        .unwrap()
        .button_proxy()
        .action_for("3");
    page.handle_request(&RequestContext::ajax().with_action(click))
        .unwrap();
    let refreshed = page.draw_refreshed(&RequestContext::ajax()).unwrap();
    let ids: Vec<&str> = refreshed.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["people", "pager"]);

    let table_html = &refreshed[0].1;
    assert!(table_html.contains("<tbody><tr><td>9</td></tr><tr><td>10</td></tr></tbody>"));
    assert!(refreshed[1].1.contains("aria-selected=\"true\" tabindex=\"0\">3</button>"));
    assert_eq!(page.control::<PagedTable>("people").unwrap().paging().slice_offsets(), (8, 10));
}

#[test]
fn test_sibling_pagers_follow_each_other() {
    let config = TabulaConfig::default();
    let mut page = pager_page(45, 1);
    page.add_control(DataPager::new("bottom", "people", &config)).unwrap();

    let click = page
        .control::<DataPager>("bottom")
        .unwrap()
        .button_proxy()
        .action_for("2");
    page.handle_request(&RequestContext::ajax().with_action(click))
        .unwrap();
    assert_eq!(page.refresh_ids(), ["people", "pager", "bottom"]);

    let refreshed = page.draw_refreshed(&RequestContext::ajax()).unwrap();
    for (_, html) in &refreshed[1..] {
        assert!(html.contains("aria-selected=\"true\" tabindex=\"0\">2</button>"));
    }
}

#[test]
fn test_page_number_survives_state_round_trip() {
    let mut page = pager_page(95, 7);
    let saved = page.save_state();

    let mut fresh = pager_page(95, 1);
    fresh.restore_state(&saved);
    assert_eq!(fresh.control::<PagedTable>("people").unwrap().page_num(), 7);
}
