// Request rewrite unit tests

use kagami::config::SigningConfig;
use kagami::error::RewriteError;
use kagami::options::OptionRegistry;
use kagami::rewrite::{RewriteResponse, Rewriter};
use kagami::store::MemoryStore;
use kagami::uri::SourceKind;
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn rewriter() -> Rewriter {
    Rewriter::new(Arc::new(OptionRegistry::default()))
}

#[fixture]
fn signing() -> SigningConfig {
    SigningConfig::with_signing("simplekey", "simplesalt")
}

fn sign(config: &SigningConfig, unsigned: &str) -> String {
    format!("/{}{}", config.sign(unsigned), unsigned)
}

#[rstest]
#[case(
    "/resize:fit:300:200/quality:80/plain/http://a.com/b.jpg",
    "/rt:fit/w:300/h:200/q:80/plain/http://a.com/b.jpg"
)]
#[case(
    "/rt:fit/rt:fill/plain/http://a.com/b.jpg",
    "/rt:fill/plain/http://a.com/b.jpg"
)]
#[case(
    "/format_quality:jpeg:70:webp:80/format_quality:png:80/plain/http://a.com/b.jpg",
    "/fq:jpeg:70:webp:80:png:80/plain/http://a.com/b.jpg"
)]
#[case(
    "/padding:::30/padding:10/padding::::40/padding::20/plain/http://a.com/b.jpg",
    "/pd:10:20:30:40/plain/http://a.com/b.jpg"
)]
#[case(
    "/resize::100:200:0:0:no:0.1:0.2/plain/http://a.com/b.jpg",
    "/w:100/h:200/el:0/ex:0:no:0.1:0.2/plain/http://a.com/b.jpg"
)]
#[case(
    "/enlarge:t/plain/https://domain.com/images/image.jgp@webp",
    "/el:1/f:webp/plain/https://domain.com/images/image.jgp"
)]
#[case(
    "/w:100/aHR0cDovL2V4YW1w/bGUuY29t.png@avif",
    "/w:100/f:avif/aHR0cDovL2V4YW1w/bGUuY29t.png"
)]
#[case("/enc/Zm9vYmFy", "/enc/Zm9vYmFy")]
#[case(
    "/pd::/w:10/plain/http://a.com/b.jpg",
    "/pd:/w:10/plain/http://a.com/b.jpg"
)]
fn test_signed_rewrites(
    rewriter: Rewriter,
    signing: SigningConfig,
    #[case] input: &str,
    #[case] expected: &str,
) {
    let result = rewriter.rewrite(&sign(&signing, input), &signing).unwrap();

    assert_eq!(result.path, sign(&signing, expected));
    assert!(signing.verify(expected, &result.signature));
}

#[rstest]
fn test_tampered_path_is_rejected(rewriter: Rewriter, signing: SigningConfig) {
    let signed = sign(&signing, "/w:100/plain/http://a.com/b.jpg");
    let tampered = signed.replace("w:100", "w:900");

    assert_eq!(
        rewriter.rewrite(&tampered, &signing),
        Err(RewriteError::SignatureInvalid)
    );
}

#[rstest]
fn test_trusted_signature_is_accepted(rewriter: Rewriter, signing: SigningConfig) {
    let mut signing = signing;
    signing.trusted_signatures.push("partner-token".to_string());

    let result = rewriter
        .rewrite("/partner-token/width:50/plain/http://a.com/b.jpg", &signing)
        .unwrap();

    assert_eq!(result.path, sign(&signing, "/w:50/plain/http://a.com/b.jpg"));
}

#[rstest]
fn test_signing_disabled_emits_unsigned(rewriter: Rewriter) {
    let disabled = SigningConfig::default();

    for input in [
        "/unsigned/w:1/plain/a.jpg",
        "/whatever/w:1/plain/a.jpg",
        "/90UxdwGRAI2bpLSHKkZculJau5ahfxfS0h3fMuQAf40/w:1/plain/a.jpg",
    ] {
        let result = rewriter.rewrite(input, &disabled).unwrap();
        assert_eq!(result.signature, "unsigned");
        assert_eq!(result.path, "/unsigned/w:1/plain/a.jpg");
    }
}

#[rstest]
fn test_custom_separator(rewriter: Rewriter) {
    let config = SigningConfig {
        arguments_separator: ',',
        ..Default::default()
    };
    let result = rewriter
        .rewrite("/unsigned/resize,fit,10,20/plain/a.jpg@png", &config)
        .unwrap();

    assert_eq!(result.options, vec!["rt,fit", "w,10", "h,20", "f,png"]);
    assert_eq!(result.source_kind, SourceKind::Plain);
    assert_eq!(result.path, "/unsigned/rt,fit/w,10/h,20/f,png/plain/a.jpg");
}

#[rstest]
#[case("", RewriteError::MalformedUri)]
#[case("/", RewriteError::MalformedUri)]
#[case("/sig", RewriteError::MalformedUri)]
#[case("//w:1/plain/a.jpg", RewriteError::MissingSignature)]
fn test_malformed_paths(rewriter: Rewriter, #[case] path: &str, #[case] expected: RewriteError) {
    assert_eq!(rewriter.rewrite(path, &SigningConfig::default()), Err(expected));
}

#[rstest]
fn test_rewrite_output_is_stable(rewriter: Rewriter, signing: SigningConfig) {
    let input = sign(
        &signing,
        "/size:300:200/gravity:sm/pd:::5/pd:1/quality:75/plain/http://a.com/b.jpg@webp",
    );
    let first = rewriter.rewrite(&input, &signing).unwrap();
    let second = rewriter.rewrite(&first.path, &signing).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_handle_maps_errors_to_forbidden() {
    let store = MemoryStore::new().with_entry(
        "config",
        r#"{"key": "simplekey", "salt": "simplesalt", "log_level": "error"}"#,
    );
    let rewriter = Rewriter::default();

    let response = rewriter
        .handle(&store, "config", "/bogus/w:1/plain/a.jpg")
        .await;
    assert_eq!(
        response,
        RewriteResponse::Forbidden {
            status: 403,
            message: "Invalid signature".to_string()
        }
    );

    let response = rewriter.handle(&store, "other", "/bogus/w:1/plain/a.jpg").await;
    assert!(response.is_forbidden());
}

#[tokio::test]
async fn test_handle_rewrites_signed_request() {
    let record = r#"{"key": "simplekey", "salt": "simplesalt"}"#;
    let store = MemoryStore::new().with_entry("config", record);
    let signing = SigningConfig::from_json(record).unwrap();
    let path = sign(&signing, "/width:10/plain/a.jpg");

    let response = Rewriter::default().handle(&store, "config", &path).await;

    assert_eq!(
        response,
        RewriteResponse::Rewrite {
            path: sign(&signing, "/w:10/plain/a.jpg")
        }
    );
}
