//! Mock-based PubMed adapter tests using wiremock.

use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use paper_proxy::config::Config;
use paper_proxy::error::GatewayError;
use paper_proxy::models::{NO_ABSTRACT, SearchParams};
use paper_proxy::sources::SourceRegistry;

fn setup_sources(mock_server: &MockServer) -> SourceRegistry {
    SourceRegistry::new(&Config::for_testing(&mock_server.uri())).unwrap()
}

fn article_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" ?><PubmedArticleSet><PubmedArticle><MedlineCitation><Article>{body}</Article></MedlineCitation></PubmedArticle></PubmedArticleSet>"#
    )
}

fn no_pmc_link(pmid: &str) -> serde_json::Value {
    json!({"header": {"type": "elink"}, "linksets": [{"dbfrom": "pubmed", "ids": [pmid]}]})
}

fn pmc_link(pmid: &str, pmcid: &str) -> serde_json::Value {
    json!({
        "linksets": [{
            "dbfrom": "pubmed",
            "ids": [pmid],
            "linksetdbs": [{"dbto": "pmc", "linkname": "pubmed_pmc", "links": [pmcid]}]
        }]
    })
}

async fn mount_efetch(mock_server: &MockServer, pmid: &str, xml: String) {
    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("id", pmid))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml))
        .mount(mock_server)
        .await;
}

async fn mount_elink(mock_server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/eutils/elink.fcgi"))
        .and(query_param("linkname", "pubmed_pmc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

// =============================================================================
// Single-paper fetch
// =============================================================================

#[tokio::test]
async fn test_fetch_by_pmid_normalizes_record() {
    let mock_server = MockServer::start().await;

    mount_efetch(
        &mock_server,
        "12345",
        article_xml(
            "<ArticleTitle>A Study</ArticleTitle><AuthorList><Author><LastName>Smith</LastName></Author></AuthorList>\
             <Abstract><AbstractText>Background.</AbstractText></Abstract>\
             <Journal><JournalIssue><PubDate><Year>2021</Year></PubDate></JournalIssue></Journal>",
        ),
    )
    .await;
    mount_elink(&mock_server, no_pmc_link("12345")).await;

    let paper = setup_sources(&mock_server).pubmed().fetch_by_pmid("12345").await.unwrap();

    assert_eq!(paper.title, "A Study");
    assert_eq!(paper.authors, vec!["Smith"]);
    assert_eq!(paper.published, "2021");
    assert_eq!(paper.r#abstract, "Background.");
    assert_eq!(paper.full_text, "");
    assert_eq!(paper.url, "https://pubmed.ncbi.nlm.nih.gov/12345/");
}

#[tokio::test]
async fn test_missing_abstract_uses_placeholder() {
    let mock_server = MockServer::start().await;

    mount_efetch(&mock_server, "1", article_xml("<ArticleTitle>Untitled  \n work</ArticleTitle>")).await;
    mount_elink(&mock_server, no_pmc_link("1")).await;

    let paper = setup_sources(&mock_server).pubmed().fetch_by_pmid("1").await.unwrap();

    assert_eq!(paper.title, "Untitled work");
    assert_eq!(paper.r#abstract, NO_ABSTRACT);
    assert!(paper.authors.is_empty());
    assert_eq!(paper.published, "");
}

#[tokio::test]
async fn test_esummary_title_fallback() {
    let mock_server = MockServer::start().await;

    mount_efetch(&mock_server, "777", article_xml("<AuthorList><Author><LastName>Doe</LastName></Author></AuthorList>")).await;
    mount_elink(&mock_server, no_pmc_link("777")).await;

    Mock::given(method("GET"))
        .and(path("/eutils/esummary.fcgi"))
        .and(query_param("id", "777"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"uids": ["777"], "777": {"uid": "777", "title": "Summary  title."}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let paper = setup_sources(&mock_server).pubmed().fetch_by_pmid("777").await.unwrap();

    assert_eq!(paper.title, "Summary title.");
    assert_eq!(paper.authors, vec!["Doe"]);
}

#[tokio::test]
async fn test_not_found_when_no_title_anywhere() {
    let mock_server = MockServer::start().await;

    mount_efetch(&mock_server, "999999999", String::new()).await;

    Mock::given(method("GET"))
        .and(path("/eutils/esummary.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&mock_server)
        .await;

    // Full text is never attempted for a missing record.
    Mock::given(method("GET"))
        .and(path("/eutils/elink.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(no_pmc_link("999999999")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = setup_sources(&mock_server).pubmed().fetch_by_pmid("999999999").await.unwrap_err();

    assert!(matches!(err, GatewayError::NotFound { .. }));
    assert!(err.to_string().contains("999999999"));
}

#[tokio::test]
async fn test_pmc_full_text_joined_paragraphs() {
    let mock_server = MockServer::start().await;

    mount_efetch(&mock_server, "555", article_xml("<ArticleTitle>With body</ArticleTitle>")).await;
    mount_elink(&mock_server, pmc_link("555", "7654321")).await;

    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .and(query_param("db", "pmc"))
        .and(query_param("id", "7654321"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<pmc-articleset><article><front><p>Front matter</p></front>\
             <body><sec><p>First  paragraph.</p><p>  </p><p>Second\nparagraph.</p></sec></body>\
             <back><p>Refs</p></back></article></pmc-articleset>",
        ))
        .mount(&mock_server)
        .await;

    let paper = setup_sources(&mock_server).pubmed().fetch_by_pmid("555").await.unwrap();

    assert_eq!(paper.full_text, "First paragraph.\n\nSecond paragraph.");
}

#[tokio::test]
async fn test_pmc_failure_degrades_to_empty_full_text() {
    let mock_server = MockServer::start().await;

    mount_efetch(&mock_server, "556", article_xml("<ArticleTitle>Still here</ArticleTitle>")).await;
    mount_elink(&mock_server, pmc_link("556", "1")).await;

    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .and(query_param("db", "pmc"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let paper = setup_sources(&mock_server).pubmed().fetch_by_pmid("556").await.unwrap();

    assert_eq!(paper.title, "Still here");
    assert_eq!(paper.full_text, "");
}

#[tokio::test]
async fn test_elink_failure_degrades_to_empty_full_text() {
    let mock_server = MockServer::start().await;

    mount_efetch(&mock_server, "557", article_xml("<ArticleTitle>T</ArticleTitle>")).await;

    Mock::given(method("GET"))
        .and(path("/eutils/elink.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let paper = setup_sources(&mock_server).pubmed().fetch_by_pmid("557").await.unwrap();
    assert_eq!(paper.full_text, "");
}

#[tokio::test]
async fn test_efetch_failure_is_upstream_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let err = setup_sources(&mock_server).pubmed().fetch_by_pmid("12345").await.unwrap_err();

    match err {
        GatewayError::UpstreamUnavailable(inner) => assert_eq!(inner.upstream_status(), Some(500)),
        other => panic!("expected UpstreamUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthenticated_fetch_waits_advisory_delay() {
    let mock_server = MockServer::start().await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.pubmed_delay = Duration::from_millis(300);

    mount_efetch(&mock_server, "12", article_xml("<ArticleTitle>Paced</ArticleTitle>")).await;
    mount_elink(&mock_server, no_pmc_link("12")).await;

    let sources = SourceRegistry::new(&config).unwrap();
    let started = Instant::now();
    let paper = sources.pubmed().fetch_by_pmid("12").await.unwrap();

    assert_eq!(paper.title, "Paced");
    assert!(started.elapsed() >= Duration::from_millis(300), "took {:?}", started.elapsed());
}

#[tokio::test]
async fn test_api_key_config_has_no_delay() {
    let config = Config::new(Some("key".to_string()), None, false);
    assert_eq!(config.pubmed_delay, Duration::ZERO);
}

#[tokio::test]
async fn test_courtesy_parameters_sent() {
    let mock_server = MockServer::start().await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.ncbi_api_key = Some("secret-key".to_string());
    config.entrez_email = Some("lab@example.org".to_string());

    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .and(query_param("tool", "paper-proxy"))
        .and(query_param("email", "lab@example.org"))
        .and(query_param("api_key", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_xml("<ArticleTitle>Keyed</ArticleTitle>")))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_elink(&mock_server, no_pmc_link("42")).await;

    let sources = SourceRegistry::new(&config).unwrap();
    let paper = sources.pubmed().fetch_by_pmid("42").await.unwrap();
    assert_eq!(paper.title, "Keyed");
}

// =============================================================================
// Search
// =============================================================================

const MEDLINE: &str = "\
PMID- 111
DP  - 2020 Jan
TI  - First result
      continued.
AU  - Smith J
AU  - Doe A
AB  - Abstract one.

PMID- 222
TI  - Second result
AU  - Roe R

PMID- 111
TI  - Duplicate of first
";

#[tokio::test]
async fn test_search_parses_medline_and_dedupes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eutils/esearch.fcgi"))
        .and(query_param("term", "crispr"))
        .and(query_param("retmax", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"count": "3", "idlist": ["111", "222", "111"]}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .and(query_param("id", "111,222,111"))
        .and(query_param("rettype", "medline"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MEDLINE))
        .mount(&mock_server)
        .await;

    let query = SearchParams { query: "crispr".to_string(), max_results: 3 }.validate().unwrap();
    let papers = setup_sources(&mock_server).pubmed().search_by_query(&query).await.unwrap();

    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].id, "111");
    assert_eq!(papers[0].title, "First result continued.");
    assert_eq!(papers[0].authors, vec!["Smith J", "Doe A"]);
    assert_eq!(papers[0].published, "2020 Jan");
    assert_eq!(papers[0].summary, "Abstract one.");
    assert_eq!(papers[1].id, "222");
    assert_eq!(papers[1].summary, "");
}

#[tokio::test]
async fn test_search_without_ids_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eutils/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"count": "0", "idlist": []}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let query = SearchParams { query: "zzzzqqqq".to_string(), max_results: 5 }.validate().unwrap();
    let papers = setup_sources(&mock_server).pubmed().search_by_query(&query).await.unwrap();

    assert!(papers.is_empty());
}

#[tokio::test]
async fn test_search_esearch_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eutils/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let query = SearchParams { query: "cancer".to_string(), max_results: 5 }.validate().unwrap();
    let err = setup_sources(&mock_server).pubmed().search_by_query(&query).await.unwrap_err();

    assert!(matches!(err, GatewayError::UpstreamUnavailable(_)));
}
