use std::collections::BTreeSet;

use super::filter::filter_users;
use super::paginate::{page_numbers, paginate, PageItem, MAX_FULL_PAGES, PAGE_SIZE_PRESETS, SIMPLE_NAV_MAX};
use super::view::{
    ButtonState, CohortView, InviteResult, NavButton, PageLink, PageView, PagerView, RowView, SizeOption,
};
use crate::api::InviteResponse;
use crate::models::{Cohort, CohortState, PanelState, UserRecord};

/// Rows currently on screen for a cohort, derived fresh from the filter value
/// and the current page/size.
pub fn visible_rows(state: &CohortState) -> Vec<UserRecord> {
    let filtered = filter_users(&state.users, &state.filter);
    paginate(&filtered, state.page, state.page_size).slice.to_vec()
}

/// Replace every row of the cohort's table.
pub fn render_table(view: &mut CohortView, slice: &[UserRecord], selected: &BTreeSet<String>) {
    view.rows = slice
        .iter()
        .map(|u| RowView {
            pk: u.pk.clone(),
            username: u.username.clone(),
            email: u.email.clone(),
            checked: selected.contains(&u.pk),
            action: u.action,
            button: ButtonState {
                label: u.action.button_label().to_string(),
                disabled: false,
            },
        })
        .collect();
}

fn nav_buttons(page: usize, pages: usize) -> Vec<NavButton> {
    let at_first = page <= 1;
    let at_last = page >= pages;
    vec![
        NavButton { page: 1, disabled: at_first, title: "first", glyph: "«" },
        NavButton { page: page.saturating_sub(1).max(1), disabled: at_first, title: "previous", glyph: "‹" },
        NavButton { page: (page + 1).min(pages), disabled: at_last, title: "next", glyph: "›" },
        NavButton { page: pages, disabled: at_last, title: "last", glyph: "»" },
    ]
}

/// Draw the pager, or hide it when the filtered list fits on one page.
pub fn render_pager(
    view: &mut CohortView,
    total: usize,
    page: usize,
    pages: usize,
    start: usize,
    end: usize,
    page_size: usize,
) {
    if total <= page_size {
        view.pager = PagerView::default();
        return;
    }

    let mut presets: Vec<usize> = PAGE_SIZE_PRESETS.to_vec();
    if !presets.contains(&page_size) {
        presets.insert(0, page_size);
    }
    let sizes = presets
        .into_iter()
        .map(|value| SizeOption { value, selected: value == page_size })
        .collect();

    let numbers = if pages <= SIMPLE_NAV_MAX {
        Vec::new()
    } else if pages <= MAX_FULL_PAGES {
        (1..=pages)
            .map(|n| PageLink { page: n, active: n == page, ellipsis: false })
            .collect()
    } else {
        page_numbers(pages, page)
            .into_iter()
            .map(|item| match item {
                PageItem::Number(n) => PageLink { page: n, active: n == page, ellipsis: false },
                PageItem::Ellipsis => PageLink { page: 0, active: false, ellipsis: true },
            })
            .collect()
    };

    view.pager = PagerView {
        visible: true,
        sizes,
        count_label: format!("{}–{} of {}", start + 1, end, total),
        nav: nav_buttons(page, pages),
        numbers,
    };
}

/// Header checkbox: checked when every visible row is selected, indeterminate
/// when only some are.
pub fn update_header_select_all(state: &CohortState, view: &mut CohortView) {
    let visible = visible_rows(state);
    let selected = visible.iter().filter(|u| state.is_selected(&u.pk)).count();
    let all = !visible.is_empty() && selected == visible.len();
    view.select_all.checked = all;
    view.select_all.indeterminate = !visible.is_empty() && !all && selected > 0;
}

/// Show each bulk button with its count, or hide it when nothing is selected.
pub fn update_bulk_buttons(state: &PanelState, page: &mut PageView) {
    for cohort in Cohort::ALL {
        let count = state.cohort(cohort).selected.len();
        let bulk = &mut page.cohort_mut(cohort).bulk;
        bulk.disabled = count == 0;
        bulk.hidden = count == 0;
        bulk.count_label = format!("{} selected", count);
    }
}

/// Show what an invite creation returned: a link (also offered to the
/// clipboard), else the invite identifier, else a note that nothing came back.
pub fn render_invite_result(page: &mut PageView, response: &InviteResponse) {
    page.invite.result = match (&response.invite_url, &response.pk) {
        (Some(url), _) => {
            page.clipboard = Some(url.clone());
            InviteResult::Link {
                url: url.clone(),
                expires: response.expires_friendly.clone(),
            }
        }
        (None, Some(pk)) => InviteResult::Identifier(pk.clone()),
        (None, None) => InviteResult::Message("no invite url returned".to_string()),
    };
}

/// Recompute the cohort's view from state: clamp the page back into state,
/// then redraw table, pager, header checkbox and bulk buttons.
pub fn refresh_table(state: &mut PanelState, page_view: &mut PageView, cohort: Cohort) {
    let cs = state.cohort(cohort);
    let filtered = filter_users(&cs.users, &cs.filter);
    let page = paginate(&filtered, cs.page, cs.page_size);
    let (total, pages, current, start, end, size) =
        (page.total, page.pages, page.page, page.start, page.end, cs.page_size);
    let slice = page.slice.to_vec();
    drop(filtered);

    state.cohort_mut(cohort).page = current;

    let cs = state.cohort(cohort);
    let view = page_view.cohort_mut(cohort);
    view.filter = cs.filter.clone();
    render_table(view, &slice, &cs.selected);
    render_pager(view, total, current, pages, start, end, size);
    update_header_select_all(cs, view);
    update_bulk_buttons(state, page_view);
}
