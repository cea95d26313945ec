// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use base64::{engine::general_purpose::STANDARD, Engine as _};
use fatsecret_tracker::services::oauth::{
    authorization_header, build_base_string, percent_encode, sign, OAuthParams, OAUTH_NONCE,
    OAUTH_SIGNATURE, OAUTH_TIMESTAMP,
};
use hmac::{Hmac, Mac};
use sha1::Sha1;

const PHOTOS_URL: &str = "http://photos.example.net/photos";

fn photos_params() -> Vec<(&'static str, &'static str)> {
    vec![
        ("file", "vacation.jpg"),
        ("size", "original"),
        ("oauth_consumer_key", "dpf43f3p2l4k3l03"),
        ("oauth_token", "nnch734d00sl2jdk"),
        ("oauth_nonce", "kllo9940pd9333jh"),
        ("oauth_timestamp", "1191242096"),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_version", "1.0"),
    ]
}

#[test]
fn test_known_signature_vector() {
    let base = build_base_string("GET", PHOTOS_URL, &photos_params());
    assert_eq!(
        base,
        "GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg%26\
         oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh%26\
         oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096%26\
         oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal"
    );

    let signature = sign(&base, "kd94hf93k423kf44", "pfkkdhi9sl3r4s00").unwrap();
    assert_eq!(signature, "tR3+Ty81lMeYAr/Fid0kMTYa/WM=");
}

#[test]
fn test_signed_params_reproduce_vector() {
    let signed = OAuthParams::with_stamp("dpf43f3p2l4k3l03", "kllo9940pd9333jh", 1191242096)
        .token("nnch734d00sl2jdk")
        .signed(
            "GET",
            PHOTOS_URL,
            &[("file", "vacation.jpg"), ("size", "original")],
            "kd94hf93k423kf44",
            "pfkkdhi9sl3r4s00",
        )
        .unwrap();

    let signature = signed
        .iter()
        .find(|(k, _)| k == OAUTH_SIGNATURE)
        .map(|(_, v)| v.as_str());
    assert_eq!(signature, Some("tR3+Ty81lMeYAr/Fid0kMTYa/WM="));
}

/// Parse `OAuth k="v", ...` back into decoded pairs.
fn parse_header(header: &str) -> Vec<(String, String)> {
    header
        .strip_prefix("OAuth ")
        .unwrap()
        .split(", ")
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap();
            let v = v.trim_matches('"');
            (k.to_string(), urlencoding::decode(v).unwrap().into_owned())
        })
        .collect()
}

#[test]
fn test_header_signature_verifies_independently() {
    let url = "https://platform.fatsecret.com/rest/food-entries/v2";
    let signed = OAuthParams::new("consumer key")
        .token("token/with+specials")
        .signed("GET", url, &[("format", "json")], "c secret", "t&secret")
        .unwrap();

    let parsed = parse_header(&authorization_header(&signed));
    assert_eq!(parsed, signed);

    // Recompute the way a server would: everything but the signature, plus the query
    let mut params: Vec<(String, String)> = parsed
        .iter()
        .filter(|(k, _)| k != OAUTH_SIGNATURE)
        .cloned()
        .collect();
    params.push(("format".to_string(), "json".to_string()));
    let base = build_base_string("GET", url, &params);

    let key = format!("{}&{}", percent_encode("c secret"), percent_encode("t&secret"));
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes()).unwrap();
    mac.update(base.as_bytes());
    let expected = STANDARD.encode(mac.finalize().into_bytes());

    let signature = &parsed.iter().find(|(k, _)| k == OAUTH_SIGNATURE).unwrap().1;
    assert_eq!(signature, &expected);
}

#[test]
fn test_fresh_stamp_per_request() {
    let a = OAuthParams::new("key");
    let b = OAuthParams::new("key");

    let ts: i64 = a.get(OAUTH_TIMESTAMP).unwrap().parse().unwrap();
    assert!((ts - chrono::Utc::now().timestamp()).abs() < 5);

    // 1 in 100M chance of a false failure
    assert_ne!(a.get(OAUTH_NONCE), b.get(OAUTH_NONCE));
}

#[test]
fn test_signature_changes_with_any_input() {
    let params = [("oauth_nonce", "1"), ("oauth_timestamp", "2")];
    let base = build_base_string("GET", "https://x.test/a", &params);
    let reference = sign(&base, "cs", "ts").unwrap();

    let other_url = build_base_string("GET", "https://x.test/b", &params);
    assert_ne!(sign(&other_url, "cs", "ts").unwrap(), reference);

    let other_method = build_base_string("POST", "https://x.test/a", &params);
    assert_ne!(sign(&other_method, "cs", "ts").unwrap(), reference);

    assert_ne!(sign(&base, "cs2", "ts").unwrap(), reference);
    assert_ne!(sign(&base, "cs", "").unwrap(), reference);
}
