//! Read-only extraction scripts injected into the target application.
//!
//! Selectors and class names below mirror the target's current markup and
//! are the most drift-prone strings in the codebase. Each script returns a
//! JSON-serializable value and swallows its own exceptions; "found
//! nothing" is always `null` or an empty array, never a thrown error.

/// Selector for the chat panel's tab button.
pub const CHAT_TAB_SELECTOR: &str = "button[aria-label='Chat']";

/// Collects chat messages from the two known container classes.
///
/// Returns `[[role, text, top], ...]` where `top` is the element's
/// vertical viewport position, used to reconstruct chronological order.
pub const COLLECT_CHAT_MESSAGES: &str = r"(() => {
  const rows = [];
  const push = (role, el) => {
    const text = (el.innerText || '').trim();
    if (text) rows.push([role, text, el.getBoundingClientRect().top]);
  };
  document.querySelectorAll('.from-user-container').forEach(el => push('user', el));
  document.querySelectorAll('.to-user-container').forEach(el => push('assistant', el));
  return rows;
})()";

/// Scans chat siblings for date-separator rows: short standalone strings
/// containing digits or month names.
pub const COLLECT_DATE_SEPARATORS: &str = r"(() => {
  const months = /jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec/i;
  const rows = [];
  document.querySelectorAll('.chat-panel .separator, .chat-panel [class*=date]').forEach(el => {
    const text = (el.innerText || '').trim();
    if (text && text.length <= 24 && (/\d/.test(text) || months.test(text))) {
      rows.push([text, el.getBoundingClientRect().top]);
    }
  });
  return rows;
})()";

/// Reads the DOM attribute carrying an artifact's embedded JSON payload.
pub const READ_ARTIFACT_JSON_ATTR: &str = r"(() => {
  const el = document.querySelector('[data-artifact-state]');
  return el ? el.getAttribute('data-artifact-state') : null;
})()";

/// Discovers the direct URL of the artifact viewer iframe, for navigation
/// when cross-frame script access is blocked.
pub const FIND_VIEWER_IFRAME_URL: &str = r"(() => {
  const frame = document.querySelector('iframe.artifact-viewer, iframe[src*=viewer]');
  return frame ? frame.src : null;
})()";

/// Scrapes a rendered data table as `[[headers], [rows...]]`.
pub const SCRAPE_RENDERED_TABLE: &str = r"(() => {
  const table = document.querySelector('.artifact-table table, table');
  if (!table) return null;
  const headers = Array.from(table.querySelectorAll('thead th')).map(th => th.innerText.trim());
  const rows = Array.from(table.querySelectorAll('tbody tr')).map(tr =>
    Array.from(tr.querySelectorAll('td')).map(td => td.innerText.trim()));
  return [headers, rows];
})()";

/// Scrapes a rendered report body as markdown-ish text.
pub const SCRAPE_RENDERED_REPORT: &str = r"(() => {
  const body = document.querySelector('.report-body, article');
  return body ? body.innerText : null;
})()";

/// Re-encodes slide images through an offscreen canvas.
///
/// The canvas round-trip is what turns authenticated/CORS-restricted image
/// responses into portable data URLs: the browser's own pipeline already
/// attached cookies when it rendered the `<img>`.
pub const COLLECT_SLIDE_IMAGES: &str = r"(() => {
  const urls = [];
  document.querySelectorAll('.slide-strip img, .slide-container img').forEach(img => {
    try {
      const canvas = document.createElement('canvas');
      canvas.width = img.naturalWidth;
      canvas.height = img.naturalHeight;
      canvas.getContext('2d').drawImage(img, 0, 0);
      urls.push(canvas.toDataURL('image/png'));
    } catch (e) {
      if (img.src) urls.push(img.src);
    }
  });
  return urls;
})()";

/// Reads the first rendered infographic image via the same canvas path.
pub const COLLECT_INFOGRAPHIC_IMAGE: &str = r"(() => {
  const img = document.querySelector('.infographic-container img, .artifact-image img');
  if (!img) return null;
  try {
    const canvas = document.createElement('canvas');
    canvas.width = img.naturalWidth;
    canvas.height = img.naturalHeight;
    canvas.getContext('2d').drawImage(img, 0, 0);
    return canvas.toDataURL('image/png');
  } catch (e) {
    return img.src || null;
  }
})()";

/// Reads any rendered image in a freshly opened tab via canvas.
pub const READ_PAGE_IMAGE: &str = r"(() => {
  const img = document.querySelector('img');
  if (!img || !img.complete) return null;
  try {
    const canvas = document.createElement('canvas');
    canvas.width = img.naturalWidth;
    canvas.height = img.naturalHeight;
    canvas.getContext('2d').drawImage(img, 0, 0);
    return canvas.toDataURL('image/png');
  } catch (e) {
    return null;
  }
})()";

/// In-page authenticated fetch: runs inside the target tab's execution
/// context so the request carries that origin's cookies.
pub const FETCH_IMAGE_IN_PAGE: &str = r"(async (url) => {
  try {
    const response = await fetch(url, { credentials: 'include' });
    if (!response.ok) return null;
    const blob = await response.blob();
    return await new Promise(resolve => {
      const reader = new FileReader();
      reader.onload = () => resolve(reader.result);
      reader.onerror = () => resolve(null);
      reader.readAsDataURL(blob);
    });
  } catch (e) {
    return null;
  }
})";
