// tests for crisis keyword detection

use failforward::{CrisisDetector, CrisisNotice, DEFAULT_PHRASES, PhraseList};
use miette::Diagnostic;

#[test]
fn test_listed_phrase_in_sentence() {
    let detector = CrisisDetector::default();
    assert!(detector.detect("오늘 너무 힘들어서 죽고 싶다는 생각이 들었어요"));
}

#[test]
fn test_ordinary_failure_story() {
    let detector = CrisisDetector::default();
    assert!(!detector.detect("오늘 시험에 실패했지만 다시 도전할 거예요"));
}

#[test]
fn test_empty_input() {
    let detector = CrisisDetector::default();
    assert!(!detector.detect(""));
    assert!(!detector.detect("   \n\t "));
}

#[test]
fn test_absent_input() {
    let detector = CrisisDetector::default();
    assert!(!detector.detect_opt(None));
    assert!(detector.detect_opt(Some("유서를 썼어요")));
}

#[test]
fn test_phrase_without_spaces() {
    let detector = CrisisDetector::default();
    assert!(detector.detect("나는 정말 죽고싶어요"));
}

#[test]
fn test_unrelated_english_word() {
    let detector = CrisisDetector::default();
    assert!(!detector.detect("DESTROY"));
}

#[test]
fn test_case_insensitive() {
    let detector = CrisisDetector::new("test", ["Hurt Myself"]);
    assert!(detector.detect("sometimes i want to HURT MYSELF"));
    assert!(detector.detect("hurt myself"));
    assert!(detector.detect("HuRt MySeLf"));
}

#[test]
fn test_matches_inside_longer_words() {
    let detector = CrisisDetector::new("test", ["die"]);
    // substring matching on purpose, no word boundaries
    assert!(detector.detect("starting a new diet today"));
}

#[test]
fn test_every_default_phrase_triggers() {
    let detector = CrisisDetector::default();
    for phrase in DEFAULT_PHRASES {
        let text = format!("앞 {phrase} 뒤");
        assert!(detector.detect(&text), "{phrase} should trigger");
    }
}

#[test]
fn test_surrounding_whitespace_ignored() {
    let detector = CrisisDetector::default();
    assert!(detector.detect("   사라지고 싶어   "));
}

#[test]
fn test_first_match_in_list_order() {
    let detector = CrisisDetector::default();
    // "죽고" comes before "죽고싶" in the list
    assert_eq!(detector.matched_phrase("죽고싶어"), Some("죽고"));
    assert_eq!(detector.matched_phrase("괜찮아요"), None);
}

#[test]
fn test_blank_phrases_dropped() {
    let detector = CrisisDetector::new("test", ["", "  ", " 목숨 "]);
    assert_eq!(detector.phrases(), ["목숨"]);
    // an empty phrase would otherwise match everything
    assert!(!detector.detect("평범한 하루"));
}

#[test]
fn test_empty_list_rejected() {
    let list = PhraseList {
        version: "empty".to_string(),
        phrases: vec![" ".to_string()],
    };
    let err = CrisisDetector::from_list(&list).unwrap_err();
    assert!(err.to_string().contains("no usable phrases"));

    // the hint covers a blank list as well as malformed json
    let help = err.help().unwrap().to_string();
    assert!(help.contains("non-blank phrase"));
}

#[test]
fn test_alternate_list() {
    let list = PhraseList::from_json(r#"{"version": "en-1", "phrases": ["End It All"]}"#).unwrap();
    let detector = CrisisDetector::from_list(&list).unwrap();

    assert_eq!(detector.version(), "en-1");
    assert!(detector.detect("I just want to end it all"));
    // the korean defaults are not part of this list
    assert!(!detector.detect("죽고 싶다"));
}

#[test]
fn test_bundled_list_matches_builtin() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/phrases/ko.json");
    let bundled = PhraseList::load(path).unwrap();
    assert_eq!(bundled, PhraseList::default());
}

#[test]
fn test_missing_phrase_file() {
    assert!(CrisisDetector::load("/definitely/not/here.json").is_err());
}

#[test]
fn test_notices() {
    assert_eq!(CrisisNotice::for_post(false), None);
    assert_eq!(CrisisNotice::for_comment(false), None);

    let post = CrisisNotice::for_post(true).unwrap();
    assert!(post.banner.contains("1393"));
    assert!(post.follow_up.is_some());

    let comment = CrisisNotice::for_comment(true).unwrap();
    assert!(comment.banner.contains("댓글"));
    assert!(comment.follow_up.is_none());
}
