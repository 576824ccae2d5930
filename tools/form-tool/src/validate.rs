//! Schema checks for form references, applied before print or push.

use url::Url;

use formgate_relay::domain::types::FormReference;

/// Collect every schema violation in `form`; an empty vec means valid.
pub fn validate_form_reference(form: &FormReference) -> Vec<String> {
    let mut errors = Vec::new();

    if let Err(e) = Url::parse(&form.form_url) {
        errors.push(format!("form_url {:?}: {e}", form.form_url));
    }

    if let Some(redirects) = &form.redirects {
        for (name, target) in [("verify", &redirects.verify), ("submit", &redirects.submit)] {
            if let Some(target) = target {
                if let Err(e) = Url::parse(target) {
                    errors.push(format!("redirects.{name} {target:?}: {e}"));
                }
            }
        }
    }

    if let Some(creds) = &form.mailgun_creds {
        if let Some(base_url) = &creds.api_base_url {
            if let Err(e) = Url::parse(base_url) {
                errors.push(format!("mailgun_creds.api_base_url {base_url:?}: {e}"));
            }
        }
    }

    if let Some(from) = &form.from_address {
        if !is_valid_from_address(from) {
            errors.push(format!(
                "from_address {from:?}: expected \"user@host\" or \"Name <user@host>\""
            ));
        }
    }

    errors
}

fn is_valid_from_address(from: &str) -> bool {
    // "Name <user@host>" — the bracketed part must contain exactly one "@".
    if let Some(open) = from.find('<') {
        if !from.ends_with('>') || open == 0 {
            return false;
        }
        let inner = &from[open + 1..from.len() - 1];
        return is_bare_address(inner);
    }
    is_bare_address(from)
}

fn is_bare_address(addr: &str) -> bool {
    match addr.split_once('@') {
        Some((user, host)) => !user.is_empty() && !host.is_empty() && !host.contains('@'),
        None => false,
    }
}
