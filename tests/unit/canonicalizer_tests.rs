// Option canonicalization unit tests

use kagami::options::*;
use rstest::rstest;

fn canonical_with(registry: &OptionRegistry, tokens: &[&str]) -> Vec<String> {
    Canonicalizer::new(registry, ':')
        .canonicalize(tokens)
        .to_tokens(':')
}

fn canonical(tokens: &[&str]) -> Vec<String> {
    canonical_with(&OptionRegistry::default(), tokens)
}

#[rstest]
#[case(&["rt:fit", "rt:fill"], &["rt:fill"])]
#[case(&["format_quality:jpeg:70:webp:80", "format_quality:png:80"], &["fq:jpeg:70:webp:80:png:80"])]
#[case(&["padding:10", "padding::20", "padding:::30", "padding::::40"], &["pd:10:20:30:40"])]
#[case(&["resize::100:200:0:0:no:0.1:0.2"], &["w:100", "h:200", "el:0", "ex:0:no:0.1:0.2"])]
#[case(&["enlarge:nope"], &["el:0"])]
#[case(&["enlarge:t"], &["el:1"])]
#[case(&["enlarge:TRUE"], &["el:1"])]
#[case(&["resizing_type:FIT"], &["rt:fit"])]
#[case(&["unknown_option:1", "w:10"], &["w:10"])]
fn test_canonical_fixtures(#[case] input: &[&str], #[case] expected: &[&str]) {
    assert_eq!(canonical(input), expected);
}

#[test]
fn test_positional_merge_order_independent() {
    let tokens = ["padding:10", "padding::20", "padding:::30", "padding::::40"];
    let forward = canonical(&tokens);

    let mut reversed = tokens;
    reversed.reverse();
    assert_eq!(canonical(&reversed), forward);

    let shuffled = [tokens[2], tokens[0], tokens[3], tokens[1]];
    assert_eq!(canonical(&shuffled), forward);
}

#[test]
fn test_positional_leading_gap_serializes_empty_field() {
    assert_eq!(canonical(&["padding::20"]), vec!["pd::20"]);
}

#[test]
fn test_idempotent_for_replace_and_concat() {
    let input = [
        "resize:fill:300:400:0",
        "gravity:sm",
        "quality:80",
        "fq:jpeg:70",
        "format_quality:webp:60",
        "enlarge:yes",
        "w:500",
    ];
    let once = canonical(&input);
    let as_refs: Vec<&str> = once.iter().map(String::as_str).collect();
    assert_eq!(canonical(&as_refs), once);
}

#[test]
fn test_idempotent_for_positional_single_token() {
    let once = canonical(&["pd:::30", "pd:10", "pd::::40"]);
    assert_eq!(once, vec!["pd:10::30:40"]);
    let as_refs: Vec<&str> = once.iter().map(String::as_str).collect();
    assert_eq!(canonical(&as_refs), once);
}

#[test]
fn test_alias_equivalence_for_every_definition() {
    let registry = OptionRegistry::new(true);

    for def in DEFINITIONS {
        let canonical_token = format!("{}:true:Abc:7", def.key);
        let expected = canonical_with(&registry, &[canonical_token.as_str()]);
        assert!(!expected.is_empty(), "{} produced nothing", def.key);

        for name in def.names() {
            let token = format!("{}:true:Abc:7", name);
            assert_eq!(
                canonical_with(&registry, &[token.as_str()]),
                expected,
                "spelling {} of {} differs",
                name,
                def.key
            );
        }
    }
}

#[test]
fn test_meta_expansion_uses_component_rules() {
    assert_eq!(
        canonical(&["resize:FIT:300:200:t"]),
        vec!["rt:fit", "w:300", "h:200", "el:1"]
    );
    assert_eq!(canonical(&["size:10::1"]), vec!["w:10", "el:1"]);
}

#[test]
fn test_restricted_options_need_extended_registry() {
    let basic = OptionRegistry::new(false);
    let extended = OptionRegistry::new(true);

    assert!(basic.lookup("watermark_url").is_none());
    assert!(canonical_with(&basic, &["wmu:aHR0cDovL2E"]).is_empty());
    assert_eq!(
        canonical_with(&extended, &["watermark_url:aHR0cDovL2E"]),
        vec!["wmu:aHR0cDovL2E"]
    );
}

#[test]
fn test_custom_separator() {
    let registry = OptionRegistry::default();
    let tokens = Canonicalizer::new(&registry, ',')
        .canonicalize(["resize,fit,100,50", "quality,90"])
        .to_tokens(',');
    assert_eq!(tokens, vec!["rt,fit", "w,100", "h,50", "q,90"]);
}

#[rstest]
#[case("https://domain.com/images/image.jgp@webp", "https://domain.com/images/image.jgp", Some("webp"))]
#[case("aHR0cDovL2V4YW1w/bGUuY29t.png@avif", "aHR0cDovL2V4YW1w/bGUuY29t.png", Some("avif"))]
#[case("http://user@host.com/a.jpg", "http://user@host.com/a.jpg", None)]
#[case("http://host.com/a.jpg@", "http://host.com/a.jpg@", None)]
#[case("http://host.com/a.jpg", "http://host.com/a.jpg", None)]
fn test_split_target_format(
    #[case] source: &str,
    #[case] base: &str,
    #[case] format: Option<&str>,
) {
    assert_eq!(split_target_format(source), (base, format));
}

#[test]
fn test_target_format_wins_over_explicit_format() {
    let registry = OptionRegistry::default();
    let canonicalizer = Canonicalizer::new(&registry, ':');
    let mut set = canonicalizer.canonicalize(["format:png", "w:10"]);

    let source = extract_target_format(&canonicalizer, &mut set, "http://a.com/b.jpg@WEBP");

    assert_eq!(source, "http://a.com/b.jpg");
    assert_eq!(set.to_tokens(':'), vec!["w:10", "f:webp"]);
}
