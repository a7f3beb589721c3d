use chrono::{NaiveDate, NaiveDateTime};
use docfill::render::TextRenderer;
use docfill::traits::{Loader, RenderError, Renderer};
use docfill::{
    FillOutcome, FillSession, MergeMode, MergeOptions, Record, SessionOptions, SlotChoice, Template,
};
use serde_json::json;
use std::path::{Path, PathBuf};

fn data_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn read_payload(name: &str) -> String {
    std::fs::read_to_string(data_root().join("payloads").join(name))
        .expect("read payload fixture")
}

fn clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 8, 20)
        .unwrap()
        .and_hms_opt(14, 5, 0)
        .unwrap()
}

fn render_text(session: &mut FillSession) -> String {
    String::from_utf8(session.render(&TextRenderer).expect("render")).expect("utf-8 output")
}

#[test]
fn two_party_declaration_is_filled_slot_by_slot() {
    let template_path = data_root().join("templates").join("to_khai.txt");
    let template = Template::read_from(template_path).unwrap();
    let mut session = FillSession::new().with_clock(clock());
    session.load_template(template);
    assert_eq!(session.available_slot_indices(), vec![1, 2]);

    session.choose_slot(SlotChoice::Indexed(1));
    assert!(matches!(
        session.receive_scan_payload(read_payload("cccd_pipe.txt")),
        FillOutcome::Applied(_)
    ));
    render_text(&mut session);

    assert_eq!(session.remaining_slot_indices(), vec![2]);

    session.choose_slot(SlotChoice::Indexed(2));
    session.receive_scan_payload(read_payload("cccd_comma.txt"));
    render_text(&mut session);
    assert_eq!(session.used_slot_indices(), vec![1, 2]);

    session.choose_slot(SlotChoice::Default);
    session.receive_scan_payload(json!({"dia_chi": "12 Lê Lợi", "ma_ho_so": "HS-1"}));
    let out = render_text(&mut session);

    assert_eq!(
        out,
        "TỜ KHAI\n\
         Người khai thứ nhất: Nguyễn Văn An, sinh ngày 15/03/1990, CCCD số 079090001234\n\
         Người khai thứ hai: Trần Thị Bình, sinh ngày 22/07/1985, CCCD số 001185007788\n\
         Địa chỉ liên hệ: 12 Lê Lợi\n\
         Mã hồ sơ: HS-1\n\
         Ngày 20 tháng 8 năm 2025\n"
    );
}

#[test]
fn word_xml_template_placeholders_survive_split_runs() {
    let template_path = data_root().join("templates").join("document.xml");
    let template = Template::read_from(template_path).unwrap();
    assert_eq!(
        template.placeholders(),
        ["ho_ten", "ns_ngay", "ns_thang", "ns_nam", "so_cccd_1", "so_cccd_2"]
    );

    let mut session = FillSession::new();
    session.set_active_template(template.placeholders());
    assert_eq!(session.available_slot_indices(), vec![1, 2]);
    assert_eq!(session.groups().len(), 5);
}

#[test]
fn restrict_mode_previews_unfilled_slots() {
    let merge = MergeOptions::new().with_mode(MergeMode::RestrictToSelection);
    let options = SessionOptions::new().with_merge(merge);
    let mut session = FillSession::with_options(options).with_clock(clock());
    session.load_template(Template::from_str("{ho_ten_1} | {ngay_cap_1}").unwrap());
    session.choose_slot(SlotChoice::Indexed(1));
    session.receive_scan_payload(json!({"ho_ten": "Võ E"}));
    assert_eq!(render_text(&mut session), "Võ E | {ngay_cap_1}");
}

#[test]
fn queued_payload_is_applied_after_render_completes() {
    let mut session = FillSession::new().with_clock(clock());
    session.load_template(Template::from_str("{ho_ten}").unwrap());

    session.receive_scan_payload(json!({"ho_ten": "Một"}));
    assert_eq!(
        session.receive_scan_payload(json!({"ho_ten": "Hai", "extra": "x"})),
        FillOutcome::Queued
    );
    assert_eq!(session.receive_scan_payload(json!({"ho_ten": "Ba"})), FillOutcome::Queued);

    assert_eq!(render_text(&mut session), "Một");
    assert!(session.is_fill_in_flight());
    assert_eq!(render_text(&mut session), "Ba");
    assert!(!session.merged_fill_data().contains_key("extra"));
}

struct RejectingRenderer;

impl Renderer for RejectingRenderer {
    fn render(&self, _template: &[u8], _data: &Record) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::new("Duplicate open tag, expected one open tag"))
    }
}

#[test]
fn render_failure_is_reported_verbatim_and_retry_is_possible() {
    let mut session = FillSession::new().with_clock(clock());
    session.load_template(Template::from_str("{ho_ten}").unwrap());
    session.receive_scan_payload(json!({"ho_ten": "Sáu"}));

    let err = session.render(&RejectingRenderer).unwrap_err();
    assert_eq!(err.to_string(), "Duplicate open tag, expected one open tag");
    assert!(session.merged_fill_data().is_empty());

    session.receive_scan_payload(json!({"ho_ten": "Sáu"}));
    assert_eq!(render_text(&mut session), "Sáu");
}

#[test]
fn switching_templates_starts_from_a_clean_state() {
    let mut session = FillSession::new().with_clock(clock());
    session.load_template(Template::from_str("{ho_ten_1} / {ho_ten_2}").unwrap());
    session.choose_slot(SlotChoice::Indexed(1));
    session.receive_scan_payload(read_payload("cccd_pipe.txt"));
    assert_eq!(render_text(&mut session), "Nguyễn Văn An / ");

    session.load_template(Template::from_str("{ho_ten} ({so_cccd})").unwrap());
    assert!(session.merged_fill_data().is_empty());
    assert!(session.used_slot_indices().is_empty());
    assert_eq!(render_text(&mut session), " ()");

    session.receive_scan_payload(read_payload("cccd_comma.txt"));
    assert_eq!(render_text(&mut session), "Trần Thị Bình (001185007788)");
}

#[test]
fn held_scan_fills_once_the_edited_template_has_one_party() {
    let options = SessionOptions::new().with_prompt_for_slot(true);
    let mut session = FillSession::with_options(options).with_clock(clock());
    session.load_template(Template::from_str("{ho_ten_1} / {ho_ten_2}").unwrap());
    assert_eq!(
        session.receive_scan_payload(read_payload("cccd_comma.txt")),
        FillOutcome::AwaitingSlot {
            indices: vec![1, 2]
        }
    );

    let outcome = session.refresh_placeholders(["ho_ten", "ngay_sinh"]);
    assert!(matches!(outcome, Some(FillOutcome::Applied(_))));
    let data = session.merged_fill_data();
    assert_eq!(data["ho_ten"], "Trần Thị Bình");
    assert_eq!(data["ngay_sinh"], "22/07/1985");
}
