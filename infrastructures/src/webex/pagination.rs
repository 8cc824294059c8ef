use reqwest::header::{HeaderMap, LINK};

use domains::models::messages::PageCursor;

/// `Link`ヘッダーから次のページのURLを取得する。
///
/// `<https://example.com/v1/events?cursor=abc>; rel="next"`の形式を想定する。
pub(crate) fn next_page_cursor(headers: &HeaderMap) -> Option<PageCursor> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(parse_next_link)
        .map(PageCursor)
}

fn parse_next_link(link: &str) -> Option<String> {
    let mut parts = link.split(';');
    let target = parts.next()?.trim();
    let url = target.strip_prefix('<')?.strip_suffix('>')?;
    let is_next = parts.any(|param| {
        let param = param.trim();
        param == r#"rel="next""# || param == "rel=next"
    });

    is_next.then(|| url.to_owned())
}
