use decision_submit::browser::{connect_to_browser, launch_browser};
use decision_submit::config::Config;
use decision_submit::infrastructure::{first_visible, ChromePage, JsExecutor, Locator, PortalPage};
use decision_submit::models::{load_records_from_csv, resolve_search_token};
use decision_submit::services::selectors::{DROPDOWNS, RESULT_LINKS, SEARCH_BUTTON, SEARCH_INPUT};
use decision_submit::services::{scan_rows, select_reason};
use decision_submit::{App, DecisionFilter};
use std::time::Duration;
use tokio_test::assert_ok;

const FIXTURE: &str = r#"data:text/html,
<html><body>
  <input type='text' id='q'>
  <input type='submit' value='Search'>
  <button>PROCESS</button>
  <table><tbody>
    <tr><td><a href='/a'>Smith</a></td><td>12345678</td><td>TMSCOMSMCL01</td></tr>
    <tr><td><a href='/b'>Smith</a></td><td>12345678</td><td>TMSCOMSING01</td></tr>
  </tbody></table>
  <select><option>Reason 1</option></select>
  <select><option>Please select</option><option>8. Not competitive</option></select>
</body></html>"#;

#[tokio::test]
async fn test_load_records_csv() {
    let path = std::env::temp_dir().join(format!("records_{}.csv", std::process::id()));
    std::fs::write(
        &path,
        "Student No,Name,Decision,Programme\n\
         12345678, Ada Lovelace ,Reject,CS\n\
         ,Blank,Accept,ML\n\
         87654321,Bob,accept,\n",
    )
    .unwrap();

    let records = load_records_from_csv(&path).await;
    let _ = std::fs::remove_file(&path);
    let records = assert_ok!(records);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].display_name, "Ada Lovelace");
    assert_eq!(resolve_search_token(&records[0].programme_code), "TMSCOMSING01");
    assert_eq!(records[1].programme_code, "");
}

#[tokio::test]
#[ignore] // needs a local Chromium: cargo test -- --ignored
async fn test_page_capabilities_on_fixture() {
    let config = Config {
        headless: true,
        ..Config::default()
    };
    let profile = std::env::temp_dir().join(format!("decision_submit_it_{}", std::process::id()));
    std::fs::create_dir_all(&profile).unwrap();

    let (mut process, page) = launch_browser(&config, &profile)
        .await
        .expect("failed to launch browser");
    let page = ChromePage::new(
        JsExecutor::new(page),
        Duration::from_millis(50),
        Duration::from_secs(10),
    );

    assert_ok!(page.goto(&FIXTURE.replace('\n', "")).await);

    let input = first_visible(&page, SEARCH_INPUT).await.unwrap();
    assert!(input.is_some());
    assert_eq!(
        first_visible(&page, SEARCH_BUTTON).await.unwrap(),
        Some(SEARCH_BUTTON[0])
    );

    let rows = page.row_links(RESULT_LINKS).await.unwrap();
    assert_eq!(rows.len(), 2);
    let (matched, _) = scan_rows(&rows, "12345678", "TMSCOMSING01");
    assert_eq!(matched, Some(1));

    assert_eq!(page.count(DROPDOWNS).await.unwrap(), 2);
    let options = page.dropdown_options(1).await.unwrap();
    let choice = select_reason(&options).expect("reason option");
    assert_ok!(page.choose_option(1, choice.index).await);
    // Text filters ignore case, on both element text and input values
    assert!(page
        .is_visible(Locator::css_with_text("button", "Process"))
        .await
        .unwrap());
    assert!(page
        .is_visible(Locator::css_with_text("input", "search"))
        .await
        .unwrap());
    assert!(!page
        .is_visible(Locator::text("No such text on the page"))
        .await
        .unwrap());

    let _ = process.browser.close().await;
    let _ = process.browser.wait().await;
    let _ = std::fs::remove_dir_all(&profile);
}

#[tokio::test]
#[ignore]
async fn test_browser_attach() {
    let port = std::env::var("BROWSER_DEBUG_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(9222);

    let result = connect_to_browser(port).await;
    assert!(result.is_ok(), "should attach to the running browser");
}

#[tokio::test]
#[ignore] // human login required
async fn test_login_and_dry_run() {
    let mut config = Config::load(None).expect("config");
    config.dry_run = true;

    let mut app = App::initialize(config).await.expect("initialize");
    let mut progress = app.reporter().subscribe_progress();
    tokio::spawn(async move {
        while let Ok(line) = progress.recv().await {
            println!("{}", line);
        }
    });

    let records = load_records_from_csv(std::path::Path::new("records.csv"))
        .await
        .expect("records.csv in the working directory");
    let result = app.run(records, DecisionFilter::new(false, true)).await;
    app.shutdown().await;

    let summary = result.expect("run");
    assert!(summary.held_for_inspection);
}
