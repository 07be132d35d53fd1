use portal_http::HttpClient;
use portal_news::{LOAD_FAILED_MESSAGE, NewsClient, NewsFeed};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> NewsClient {
    NewsClient::new(HttpClient::new(&format!("{}/v0/", server.uri())).unwrap())
}

async fn mount_item(server: &MockServer, id: u64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v0/item/{id}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn keeps_linked_stories_in_ranking_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([30, 10, 20, 40])))
        .mount(&server)
        .await;
    mount_item(&server, 30, json!({"id":30,"title":"third","url":"https://c.example","score":5,"time":1})).await;
    mount_item(&server, 10, json!({"id":10,"title":"Ask HN: no link","score":9,"time":2})).await;
    mount_item(&server, 20, json!(null)).await;
    mount_item(&server, 40, json!({"id":40,"title":"fourth","url":"https://d.example","time":3})).await;

    let stories = client(&server).top_stories().await.unwrap();
    let ids: Vec<u64> = stories.iter().map(|s| s.id).collect();
    assert_eq!(ids, [30, 40]);
    assert_eq!(stories[1].score, 0);
}

#[tokio::test]
async fn only_the_first_ids_are_fetched() {
    let server = MockServer::start().await;
    let ids: Vec<u64> = (1..=25).collect();
    Mock::given(method("GET"))
        .and(path("/v0/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&ids))
        .mount(&server)
        .await;
    for id in &ids {
        mount_item(&server, *id, json!({"id":id,"title":"t","url":"https://x.example"})).await;
    }

    let stories = client(&server).top_stories().await.unwrap();
    assert_eq!(stories.len(), 20);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 21);

    let three = client(&server).with_limit(3).top_stories().await.unwrap();
    assert_eq!(three.len(), 3);
}

#[tokio::test]
async fn refresh_records_failure_message_and_clears_stories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_item(&server, 1, json!({"id":1,"title":"one","url":"https://a.example"})).await;
    Mock::given(method("GET"))
        .and(path("/v0/topstories.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client(&server);
    let mut feed = NewsFeed::new();

    feed.refresh(&client).await;
    assert_eq!(feed.stories.len(), 1);
    assert!(feed.error.is_none());

    feed.refresh(&client).await;
    assert!(feed.stories.is_empty());
    assert_eq!(feed.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
}
