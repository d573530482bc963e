use scraper::{ElementRef, Html, Selector};

/// Get the first form in `html`, panicking if there is none.
#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found in document")
}

/// Assert that `form` posts to `endpoint` via the HTMX attribute `hx_attribute`
/// (e.g. "hx-post" or "hx-put").
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef, endpoint: &str, hx_attribute: &str) {
    let got = form.value().attr(hx_attribute);

    assert_eq!(
        got,
        Some(endpoint),
        "want form with attribute {hx_attribute}=\"{endpoint}\", got {got:?}"
    );
}

/// Assert that `form` contains an input named `name` with the type `input_type`.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef, name: &str, input_type: &str) {
    let selector = Selector::parse(&format!("input[name={name}][type={input_type}]")).unwrap();

    assert!(
        form.select(&selector).next().is_some(),
        "want input with name \"{name}\" and type \"{input_type}\", got none"
    );
}

/// Assert that `form` contains a submit button.
#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef) {
    let selector = Selector::parse("button[type=submit]").unwrap();

    assert!(
        form.select(&selector).next().is_some(),
        "want form with a submit button, got none"
    );
}
