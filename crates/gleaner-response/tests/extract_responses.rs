//! Integration tests driving the dispatch layer over saved exchanges
//!
//! These verify the pieces fit together the way a scraping pipeline
//! uses them: `Chained` rewinding a shared body cursor, and a
//! `label(url, Named)` stack producing fully labeled records.

use gleaner_core::{label, value, values, Chained, ExtractError, Extractor, Named, Record, Rewind};
use gleaner_response::{url_label, Response};
use serde_json::Value;

const ROBOTS: &[u8] = b"HTTP/1.1 200 OK\r\n\
Content-Type: text/plain\r\n\
X-Request-URL: http://example.net/robots.txt\r\n\
\r\n\
# /robots.txt\n\
Disallow: /private\n";

const PROFILE: &[u8] = b"HTTP/1.1 200 OK\r\n\
Content-Type: text/plain\r\n\
X-Request-URL: http://people.example.net/alice\r\n\
\r\n\
Alice\n\
Duluth\n";

const UNLABELED: &[u8] = b"HTTP/1.1 200 OK\r\n\
Content-Type: text/plain\r\n\
\r\n\
Alice\n";

fn first_line(response: &Response) -> Vec<Result<Value, ExtractError>> {
    vec![response
        .read_line()
        .map(Value::from)
        .ok_or_else(|| ExtractError::Read("end of body".to_string()))]
}

#[test]
fn test_chained_reseeks_the_response() {
    let response = Response::from_read(ROBOTS).unwrap();
    // the same extractor twice
    let extract = Chained::<Response>::new()
        .with(values(first_line))
        .with(values(first_line));
    let records: Vec<_> = extract.extract(&response).unwrap().collect();
    // both reads observe the first line because the body is rewound
    assert_eq!(
        records,
        vec![
            Record::value("# /robots.txt\n"),
            Record::value("# /robots.txt\n"),
        ]
    );
}

#[test]
fn test_named_fields_labeled_with_url() {
    fn name(response: &Response) -> Result<Value, ExtractError> {
        response.rewind();
        let line = response.read_line().unwrap_or_default();
        Ok(Value::from(line.trim_end()))
    }

    fn city(response: &Response) -> Result<Value, ExtractError> {
        response.rewind();
        response.read_line();
        let line = response.read_line().unwrap_or_default();
        Ok(Value::from(line.trim_end()))
    }

    let fields = Named::<Response>::new()
        .with("name", value(name))
        .with("city", value(city));
    let extract = label(url_label, fields);

    let response = Response::from_read(PROFILE).unwrap();
    let records: Vec<_> = extract.extract(&response).unwrap().collect();
    assert_eq!(
        records,
        vec![
            Record::value("Alice")
                .labelled("name")
                .labelled("http://people.example.net/alice"),
            Record::value("Duluth")
                .labelled("city")
                .labelled("http://people.example.net/alice"),
        ]
    );
}

#[test]
fn test_missing_url_suppresses_the_document() {
    let fields = Named::<Response>::new().with(
        "name",
        value(|r: &Response| Ok::<_, ExtractError>(r.body_str().into_owned())),
    );
    let extract = label(url_label, fields);

    let response = Response::from_read(UNLABELED).unwrap();
    let records: Vec<_> = extract.extract(&response).unwrap().collect();
    assert!(records.is_empty());
}

#[test]
fn test_domain_filtering_labeller() {
    // a labeller interested in one host only
    fn same_host(response: &Response) -> Option<String> {
        response
            .url()
            .filter(|url| url.host_str() == Some("example.net"))
            .map(|url| url.to_string())
    }

    let extract = label(
        same_host,
        value(|r: &Response| Ok::<_, ExtractError>(r.body_str().into_owned())),
    );

    let matching = Response::from_read(ROBOTS).unwrap();
    let other = Response::from_read(PROFILE).unwrap();
    assert_eq!(extract.extract(&matching).unwrap().count(), 1);
    assert_eq!(extract.extract(&other).unwrap().count(), 0);
}

#[test]
fn test_records_serialize_as_json_lines() {
    let fields = Named::<Response>::new().with(
        "first",
        values(|r: &Response| {
            vec![Ok::<_, ExtractError>(Value::from(
                r.read_line().unwrap_or_default().trim_end(),
            ))]
        }),
    );
    let extract = label(url_label, fields);

    let response = Response::from_read(ROBOTS).unwrap();
    let lines: Vec<String> = extract
        .extract(&response)
        .unwrap()
        .map(|record| serde_json::to_string(&record).unwrap())
        .collect();
    assert_eq!(
        lines,
        [r##"["http://example.net/robots.txt","first","# /robots.txt"]"##]
    );
}
