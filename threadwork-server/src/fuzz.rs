#![cfg(test)]

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{self, request},
    Router,
};
use chrono::{Duration, Utc};
use std::{fmt::Debug, panic::AssertUnwindSafe};
use threadwork_api::{
    Account, AccountId, AuthToken, Error as ApiError, Item, ItemId, ItemMetadata, Tag, Uuid, Vote,
    VoteDirection,
};
use threadwork_store::{Dump, MemStore, Session};
use tower::ServiceExt;

use crate::{extractors::*, *};

macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

do_tokio_test!(fuzz_preauth_extractor, String, |token| async move {
    if let Ok(req) = http::Request::builder()
        .method(http::Method::GET)
        .uri("/")
        .header(http::header::AUTHORIZATION, token)
        .body(())
    {
        let mut req = req.into_parts().0;
        let res = PreAuth::from_request_parts(&mut req, &()).await;
        match res {
            Ok(_) => (),
            Err(Error::Api(ApiError::PermissionDenied)) => (),
            Err(e) => panic!("got unexpected error: {e}"),
        }
    }
});

const TOKEN: Uuid = Uuid::from_u128(100);

fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn account(n: u128, invited_by: Option<u128>) -> Account {
    Account {
        id: AccountId(id(n)),
        handle: format!("user{n}"),
        created_by: invited_by.map(|p| AccountId(id(p))),
        created_at: Utc::now() - Duration::days(3),
        updated_at: Utc::now() - Duration::days(3),
        score: 0,
        deleted: false,
        private: false,
    }
}

fn item(n: u128, parent: Option<u128>, title: Option<&str>) -> Item {
    Item {
        id: ItemId(id(n)),
        parent_id: parent.map(|p| ItemId(id(p))),
        op_id: parent.map(|_| ItemId(id(10))),
        author_id: AccountId(id(1)),
        author_handle: String::from("user1"),
        title: title.map(String::from),
        mime_type: String::from("text/html"),
        data: format!("<p>item {n} about #rust</p>"),
        score: 0,
        submitted_at: Utc::now() - Duration::hours(2),
        updated_at: Utc::now() - Duration::hours(2),
        deleted: false,
        metadata: ItemMetadata {
            tags: vec![Tag {
                name: String::from("#rust"),
                url: String::from("/t/rust"),
            }],
            mentions: Vec::new(),
        },
    }
}

fn test_app() -> Router {
    app(MemStore::from_dump(Dump {
        accounts: vec![account(1, None), account(2, Some(1))],
        items: vec![
            item(10, None, Some("First")),
            item(11, Some(10), None),
            item(12, Some(11), None),
            item(20, None, Some("Second")),
        ],
        votes: Vec::new(),
        sessions: vec![Session {
            token: AuthToken(TOKEN),
            account: AccountId(id(2)),
        }],
    }))
}

async fn call<Resp>(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<Uuid>,
) -> Result<Resp, ApiError>
where
    Resp: 'static + for<'de> serde::Deserialize<'de> + Debug,
{
    let req = request::Builder::new().method(method).uri(uri);
    let req = match token {
        Some(token) => req.header(http::header::AUTHORIZATION, format!("bearer {token}")),
        None => req,
    };
    let req = req.body(Body::empty()).expect("building request");
    let resp = app.clone().oneshot(req).await.expect("running request");
    let status = resp.status();
    let body = hyper::body::to_bytes(resp.into_body())
        .await
        .expect("recovering resp bytes");
    if status == http::StatusCode::OK {
        return Ok(serde_json::from_slice(&body)
            .unwrap_or_else(|err| panic!("failed parsing resp body {body:?}: {err}")));
    }
    let err = ApiError::parse(&body)
        .unwrap_or_else(|err| panic!("parsing error response body {err}, body is {body:?}"));
    assert_eq!(status, err.status_code());
    Err(err)
}

fn run<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed initializing tokio runtime")
        .block_on(f)
}

#[test]
fn index_lists_top_level_items() {
    run(async {
        let app = test_app();
        let index: serde_json::Value = call(&app, "GET", "/api/index", None).await.unwrap();
        let index = index.as_array().unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.iter().all(|t| t["level"] == 0));
        assert!(index.iter().all(|t| t["from_now"] == "2 hours ago"));
        assert!(index
            .iter()
            .any(|t| t["data"] == "<p>item 10 about <a href='/t/rust'>&#35;rust</a></p>"));
    })
}

#[test]
fn thread_is_nested() {
    run(async {
        let app = test_app();
        let uri = format!("/api/items/{}", id(10));
        let thread: serde_json::Value = call(&app, "GET", &uri, None).await.unwrap();
        assert_eq!(thread["title"], "First");
        let op = &thread["items"][0];
        assert_eq!(op["level"], 0);
        assert_eq!(op["children"][0]["level"], 1);
        assert_eq!(op["children"][0]["children"][0]["level"], 2);
        assert_eq!(op["vote"], serde_json::Value::Null);
    })
}

#[test]
fn missing_item_is_not_found() {
    run(async {
        let app = test_app();
        let uri = format!("/api/items/{}", id(999));
        let res = call::<serde_json::Value>(&app, "GET", &uri, None).await;
        assert!(matches!(res, Err(ApiError::NotFound(_))));
    })
}

#[test]
fn voting_requires_auth() {
    run(async {
        let app = test_app();
        let uri = format!("/api/items/{}/yay", id(11));
        let res = call::<Vote>(&app, "POST", &uri, None).await;
        assert_eq!(res.unwrap_err(), ApiError::PermissionDenied);
        let res = call::<Vote>(&app, "POST", &uri, Some(id(101))).await;
        assert_eq!(res.unwrap_err(), ApiError::PermissionDenied);
    })
}

#[test]
fn invalid_credentials_are_refused_on_reads() {
    run(async {
        let app = test_app();
        let res = call::<serde_json::Value>(&app, "GET", "/api/index", Some(id(101))).await;
        assert_eq!(res.unwrap_err(), ApiError::PermissionDenied);
    })
}

#[test]
fn votes_show_up_in_threads() {
    run(async {
        let app = test_app();
        let uri = format!("/api/items/{}/nay", id(11));
        let vote: Vote = call(&app, "POST", &uri, Some(TOKEN)).await.unwrap();
        assert_eq!(vote.submitted_by, AccountId(id(2)));
        assert_eq!(vote.direction(), Some(VoteDirection::Nay));

        // voting again the same way changes nothing
        let again: Vote = call(&app, "POST", &uri, Some(TOKEN)).await.unwrap();
        assert_eq!(again, vote);

        let uri = format!("/api/items/{}", id(10));
        let thread: serde_json::Value = call(&app, "GET", &uri, Some(TOKEN)).await.unwrap();
        let reply = &thread["items"][0]["children"][0];
        assert_eq!(reply["vote"], "nay");
        assert_eq!(reply["score"], "-1");

        let anon: serde_json::Value = call(&app, "GET", &uri, None).await.unwrap();
        assert_eq!(anon["items"][0]["children"][0]["vote"], serde_json::Value::Null);
    })
}

#[test]
fn invalid_direction_is_rejected() {
    run(async {
        let app = test_app();
        let uri = format!("/api/items/{}/sideways", id(11));
        let res = call::<Vote>(&app, "POST", &uri, Some(TOKEN)).await;
        assert_eq!(
            res.unwrap_err(),
            ApiError::InvalidDirection(String::from("sideways"))
        );
    })
}

#[test]
fn whoami_and_accounts() {
    run(async {
        let app = test_app();
        let me: AccountId = call(&app, "GET", "/api/whoami", Some(TOKEN)).await.unwrap();
        assert_eq!(me, AccountId(id(2)));

        let accounts: serde_json::Value = call(&app, "GET", "/api/accounts", None).await.unwrap();
        assert_eq!(accounts[0]["handle"], "user1");
        assert_eq!(accounts[0]["children"][0]["handle"], "user2");
        assert_eq!(accounts[0]["children"][0]["level"], 1);

        let filtered: serde_json::Value = call(&app, "GET", "/api/accounts?handle=user2", None)
            .await
            .unwrap();
        assert_eq!(filtered.as_array().unwrap().len(), 1);
        assert_eq!(filtered[0]["level"], 0);
    })
}
