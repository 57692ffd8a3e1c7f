use reqwest::{StatusCode, header::LOCATION, redirect::Policy};
use serde_json::Value;

use rolegate_api::app::{self, AppServices};
use rolegate_api::config::{ApiConfig, BootstrapAdmin};
use rolegate_auth::Password;
use rolegate_core::Email;

const ADMIN_EMAIL: &str = "root@uni.edu";
const ADMIN_PASSWORD: &str = "rootpw1";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory collaborators, ephemeral port.
        let config = ApiConfig {
            bootstrap_admin: Some(BootstrapAdmin {
                email: Email::parse(ADMIN_EMAIL).unwrap(),
                password: Password::new(ADMIN_PASSWORD),
            }),
            ..ApiConfig::default()
        };
        let services = AppServices::in_memory(&config);
        app::services::bootstrap(&services, &config)
            .await
            .expect("bootstrap admin");
        let app = app::build_app(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    /// A browser-like client: keeps cookies, does not follow redirects.
    fn browser(&self) -> Browser {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .unwrap();
        Browser {
            client,
            base_url: self.base_url.clone(),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct Browser {
    client: reqwest::Client,
    base_url: String,
}

impl Browser {
    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    async fn signup(&self, email: &str, role: &str) -> reqwest::Response {
        self.post_form(
            "/signup",
            &[
                ("email", email),
                ("password", "secret1"),
                ("confirm", "secret1"),
                ("role", role),
                ("gender", "other"),
                ("date_of_birth", "2000-01-15"),
            ],
        )
        .await
    }

    async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_form("/login", &[("email", email), ("password", password)]).await
    }

    async fn page(&self, path: &str) -> Value {
        let res = self.get(path).await;
        assert_eq!(res.status(), StatusCode::OK, "GET {path}");
        res.json().await.unwrap()
    }
}

fn location(res: &reqwest::Response) -> &str {
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    res.headers().get(LOCATION).unwrap().to_str().unwrap()
}

fn flash_message(page: &Value) -> &str {
    page["flash"]["message"].as_str().unwrap_or_default()
}

async fn admin(server: &TestServer) -> Browser {
    let admin = server.browser();
    let res = admin.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(location(&res), "/admin/dashboard");
    admin
}

async fn pending_uid(admin: &Browser, email: &str) -> String {
    let page = admin.page("/admin/requests").await;
    page["requests"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["email"] == email)
        .and_then(|r| r["uid"].as_str())
        .expect("pending request listed")
        .to_string()
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let res = server.browser().get("/health").await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn unauthenticated_dashboard_redirects_to_login_with_message() {
    let server = TestServer::spawn().await;
    let browser = server.browser();

    for path in ["/student/dashboard", "/lecturer/dashboard", "/admin/dashboard", "/admin/requests"] {
        let res = browser.get(path).await;
        assert_eq!(location(&res), "/login", "{path}");
    }

    let page = browser.page("/login").await;
    assert_eq!(flash_message(&page), "Please log in to continue.");
    assert!(page["session"].is_null());
}

#[tokio::test]
async fn flash_is_shown_once() {
    let server = TestServer::spawn().await;
    let browser = server.browser();

    browser.get("/student/dashboard").await;
    let first = browser.page("/login").await;
    assert!(!flash_message(&first).is_empty());
    let second = browser.page("/login").await;
    assert!(second["flash"].is_null());
}

#[tokio::test]
async fn student_signup_login_and_role_fencing() {
    let server = TestServer::spawn().await;
    let browser = server.browser();

    let res = browser.signup("A@X.com", "student").await;
    assert_eq!(location(&res), "/login");
    let page = browser.page("/login").await;
    assert_eq!(flash_message(&page), "Account created successfully. Please log in.");

    let res = browser.login("a@x.com", "secret1").await;
    assert_eq!(location(&res), "/student/dashboard");

    let dash = browser.page("/student/dashboard").await;
    assert_eq!(dash["page"], "student_dashboard");
    assert_eq!(dash["session"]["role"], "student");
    assert_eq!(dash["session"]["email"], "a@x.com");

    let res = browser.get("/admin/requests").await;
    assert_eq!(location(&res), "/");
    let res = browser.get("/lecturer/dashboard").await;
    assert_eq!(location(&res), "/");
    let home = browser.page("/").await;
    assert_eq!(flash_message(&home), "You are not authorized to view that page.");
}

#[tokio::test]
async fn admin_nomination_waits_for_approval() {
    let server = TestServer::spawn().await;
    let nominee = server.browser();

    let res = nominee.signup("b@x.com", "admin").await;
    assert_eq!(location(&res), "/login");
    let page = nominee.page("/login").await;
    assert_eq!(
        flash_message(&page),
        "Account created. Admin request submitted for review."
    );

    let res = nominee.login("b@x.com", "secret1").await;
    assert_eq!(location(&res), "/login");
    let page = nominee.page("/login").await;
    assert_eq!(page["flash"]["kind"], "info");
    assert!(flash_message(&page).contains("awaiting approval"));
    assert!(page["session"].is_null());

    let res = nominee.get("/admin/dashboard").await;
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn approval_grants_admin_dashboard() {
    let server = TestServer::spawn().await;
    let nominee = server.browser();
    nominee.signup("b@x.com", "admin").await;

    let admin = admin(&server).await;
    let uid = pending_uid(&admin, "b@x.com").await;

    let detail = admin.page(&format!("/admin/request/{uid}")).await;
    assert_eq!(detail["request"]["status"], "pending");
    assert_eq!(detail["profile"]["role"], "pending_admin");

    let res = admin.post_form(&format!("/admin/approve/{uid}"), &[]).await;
    assert_eq!(location(&res), "/admin/requests");
    let list = admin.page("/admin/requests").await;
    assert_eq!(flash_message(&list), "b@x.com approved as admin.");
    assert!(list["requests"].as_array().unwrap().is_empty());

    let res = nominee.login("b@x.com", "secret1").await;
    assert_eq!(location(&res), "/admin/dashboard");
    let dash = nominee.page("/admin/dashboard").await;
    assert_eq!(dash["session"]["role"], "admin");
}

#[tokio::test]
async fn rejection_is_final() {
    let server = TestServer::spawn().await;
    let nominee = server.browser();
    nominee.signup("c@x.com", "admin").await;

    let admin = admin(&server).await;
    let uid = pending_uid(&admin, "c@x.com").await;

    let res = admin.post_form(&format!("/admin/reject/{uid}"), &[]).await;
    assert_eq!(location(&res), "/admin/requests");
    admin.page("/admin/requests").await;

    let res = admin.post_form(&format!("/admin/approve/{uid}"), &[]).await;
    assert_eq!(location(&res), "/admin/requests");
    let list = admin.page("/admin/requests").await;
    assert_eq!(flash_message(&list), "That request has already been reviewed.");

    let res = nominee.login("c@x.com", "secret1").await;
    assert_eq!(location(&res), "/login");
    let page = nominee.page("/login").await;
    assert_eq!(
        flash_message(&page),
        "You are not authorized to access this application."
    );
}

#[tokio::test]
async fn review_actions_require_an_admin_session() {
    let server = TestServer::spawn().await;
    let nominee = server.browser();
    nominee.signup("h@x.com", "admin").await;

    let admin = admin(&server).await;
    let uid = pending_uid(&admin, "h@x.com").await;

    let anonymous = server.browser();
    let res = anonymous.post_form(&format!("/admin/approve/{uid}"), &[]).await;
    assert_eq!(location(&res), "/login");

    let student = server.browser();
    student.signup("i@x.com", "student").await;
    student.login("i@x.com", "secret1").await;
    let res = student.post_form(&format!("/admin/reject/{uid}"), &[]).await;
    assert_eq!(location(&res), "/");

    let detail = admin.page(&format!("/admin/request/{uid}")).await;
    assert_eq!(detail["request"]["status"], "pending");
    assert_eq!(pending_uid(&admin, "h@x.com").await, uid);

    let res = nominee.login("h@x.com", "secret1").await;
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn duplicate_signup_is_refused() {
    let server = TestServer::spawn().await;
    let browser = server.browser();

    browser.signup("d@x.com", "student").await;
    browser.page("/login").await;

    let res = browser.signup("d@x.com", "admin").await;
    assert_eq!(location(&res), "/signup");
    let page = browser.page("/signup").await;
    assert_eq!(page["flash"]["kind"], "error");
    assert!(flash_message(&page).contains("already exists"));

    let admin = admin(&server).await;
    let list = admin.page("/admin/requests").await;
    assert!(list["requests"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_signup_names_the_fields() {
    let server = TestServer::spawn().await;
    let browser = server.browser();

    let res = browser
        .post_form(
            "/signup",
            &[
                ("email", "not-an-email"),
                ("password", "123"),
                ("confirm", "456"),
                ("role", "student"),
            ],
        )
        .await;
    assert_eq!(location(&res), "/signup");
    let page = browser.page("/signup").await;
    let message = flash_message(&page);
    assert!(message.contains("email"), "{message}");
    assert!(message.contains("password"), "{message}");
}

#[tokio::test]
async fn bad_credentials_share_one_message() {
    let server = TestServer::spawn().await;
    let browser = server.browser();
    browser.signup("e@x.com", "lecturer").await;

    browser.login("e@x.com", "wrong-password").await;
    let wrong = browser.page("/login").await;
    browser.login("nobody@x.com", "secret1").await;
    let unknown = browser.page("/login").await;

    assert_eq!(flash_message(&wrong), "Invalid email or password.");
    assert_eq!(flash_message(&wrong), flash_message(&unknown));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let server = TestServer::spawn().await;
    let browser = server.browser();
    browser.signup("f@x.com", "lecturer").await;

    let res = browser.login("f@x.com", "secret1").await;
    assert_eq!(location(&res), "/lecturer/dashboard");
    browser.page("/lecturer/dashboard").await;

    let res = browser.get("/logout").await;
    assert_eq!(location(&res), "/");
    let home = browser.page("/").await;
    assert_eq!(flash_message(&home), "You have been logged out.");
    assert!(home["session"].is_null());

    let res = browser.get("/lecturer/dashboard").await;
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn admin_can_open_lecturer_dashboard() {
    let server = TestServer::spawn().await;
    let admin = admin(&server).await;
    let dash = admin.page("/lecturer/dashboard").await;
    assert_eq!(dash["page"], "lecturer_dashboard");
}

#[tokio::test]
async fn admin_profile_views_check_role() {
    let server = TestServer::spawn().await;
    let student = server.browser();
    student.signup("g@x.com", "student").await;
    student.login("g@x.com", "secret1").await;
    let uid = student.page("/student/dashboard").await["session"]["uid"]
        .as_str()
        .unwrap()
        .to_string();

    let admin = admin(&server).await;
    let view = admin.page(&format!("/admin/student/{uid}")).await;
    assert_eq!(view["profile"]["email"], "g@x.com");
    assert_eq!(view["profile"]["gender"], "other");

    let res = admin.get(&format!("/admin/lecturer/{uid}")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = admin.get("/admin/request/not-a-uid").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
