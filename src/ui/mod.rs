// Filtering, pagination and the rendered page model
pub mod debounce;
pub mod filter;
pub mod paginate;
pub mod render;
pub mod view;

pub use debounce::{Debouncer, FILTER_DEBOUNCE};
pub use filter::filter_users;
pub use paginate::{page_numbers, paginate, Page, PageItem, DEFAULT_PAGE_SIZE, PAGE_SIZE_PRESETS};
pub use render::{
    refresh_table, render_invite_result, render_pager, render_table, update_bulk_buttons,
    update_header_select_all, visible_rows,
};
pub use view::{CohortView, InviteResult, InviteView, PageView, PagerView, RowView};
