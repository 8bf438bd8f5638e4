//! C FFI bindings for rx-core
//!
//! This crate exposes the record store to a C/C++ (or other) presentation
//! layer: ingest decoded report text, set column filters, cycle the sort and
//! read the resulting view cell by cell. Columns are addressed by index in
//! display order (0 = document .. 5 = discount).

use rx_core::{parse_report, Column, Record, RecordStore};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

/// Opaque handle to a record store and its cached view
pub struct FfiStore {
    inner: RecordStore,
    view: Vec<Record>,
}

impl FfiStore {
    fn refresh(&mut self) {
        self.view = self.inner.view().into_iter().cloned().collect();
    }
}

unsafe fn to_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        None
    } else {
        CStr::from_ptr(s).to_str().ok()
    }
}

fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Create an empty record store
#[no_mangle]
pub extern "C" fn rx_store_new() -> *mut FfiStore {
    Box::into_raw(Box::new(FfiStore {
        inner: RecordStore::new(),
        view: Vec::new(),
    }))
}

/// Free a record store
///
/// # Safety
/// - `store` must be a valid pointer returned by `rx_store_new` or null
#[no_mangle]
pub unsafe extern "C" fn rx_store_free(store: *mut FfiStore) {
    if !store.is_null() {
        drop(Box::from_raw(store));
    }
}

/// Parse a report and append its records
///
/// Returns the number of records parsed from this report, or -1 if an
/// argument is null or not valid UTF-8.
///
/// # Safety
/// - `store` must be a valid pointer returned by `rx_store_new`
/// - `text` and `source_id` must be valid C strings
#[no_mangle]
pub unsafe extern "C" fn rx_store_ingest_text(
    store: *mut FfiStore,
    text: *const c_char,
    source_id: *const c_char,
) -> i64 {
    if store.is_null() {
        return -1;
    }
    let (Some(text), Some(source_id)) = (to_str(text), to_str(source_id)) else {
        return -1;
    };

    let store = &mut *store;
    let records = parse_report(text, source_id);
    let count = records.len() as i64;
    store.inner.ingest(records);
    store.refresh();
    count
}

/// Remove all records and reset filters and sort
///
/// # Safety
/// - `store` must be a valid pointer returned by `rx_store_new`
#[no_mangle]
pub unsafe extern "C" fn rx_store_clear(store: *mut FfiStore) {
    if store.is_null() {
        return;
    }
    let store = &mut *store;
    store.inner.clear();
    store.refresh();
}

/// Set the substring filter for a column; an empty or null pattern clears it
///
/// Returns false if the column index is out of range or the pattern is not
/// valid UTF-8.
///
/// # Safety
/// - `store` must be a valid pointer returned by `rx_store_new`
/// - `pattern` must be a valid C string or null
#[no_mangle]
pub unsafe extern "C" fn rx_store_set_filter(
    store: *mut FfiStore,
    column: usize,
    pattern: *const c_char,
) -> bool {
    if store.is_null() {
        return false;
    }
    let Some(column) = Column::from_index(column) else {
        return false;
    };

    let pattern = if pattern.is_null() {
        ""
    } else {
        match to_str(pattern) {
            Some(pattern) => pattern,
            None => return false,
        }
    };

    let store = &mut *store;
    store.inner.set_filter(column, pattern);
    store.refresh();
    true
}

/// Advance the sort for a column (none -> ascending -> descending -> none)
///
/// Returns the new direction: 0 = none, 1 = ascending, 2 = descending,
/// or -1 if the column index is out of range.
///
/// # Safety
/// - `store` must be a valid pointer returned by `rx_store_new`
#[no_mangle]
pub unsafe extern "C" fn rx_store_cycle_sort(store: *mut FfiStore, column: usize) -> i32 {
    if store.is_null() {
        return -1;
    }
    let Some(column) = Column::from_index(column) else {
        return -1;
    };

    let store = &mut *store;
    store.inner.cycle_sort(column);
    store.refresh();
    store.inner.sort().direction as i32
}

/// Whether anything has been ingested since creation or the last clear
///
/// # Safety
/// - `store` must be a valid pointer returned by `rx_store_new`
#[no_mangle]
pub unsafe extern "C" fn rx_store_has_ingested(store: *const FfiStore) -> bool {
    if store.is_null() {
        return false;
    }
    (*store).inner.has_ingested()
}

/// Total number of records, ignoring filters
///
/// # Safety
/// - `store` must be a valid pointer returned by `rx_store_new`
#[no_mangle]
pub unsafe extern "C" fn rx_store_record_count(store: *const FfiStore) -> usize {
    if store.is_null() {
        return 0;
    }
    (*store).inner.len()
}

/// Number of rows in the filtered, sorted view
///
/// # Safety
/// - `store` must be a valid pointer returned by `rx_store_new`
#[no_mangle]
pub unsafe extern "C" fn rx_view_row_count(store: *const FfiStore) -> usize {
    if store.is_null() {
        return 0;
    }
    (*store).view.len()
}

/// Get a column's header label
///
/// Returns null if index is out of bounds. Caller must free the returned
/// string with `rx_free_string`.
#[no_mangle]
pub extern "C" fn rx_column_label(index: usize) -> *mut c_char {
    Column::from_index(index)
        .map(|c| to_c_string(c.label()))
        .unwrap_or(ptr::null_mut())
}

/// Get a view cell as a string
///
/// # Safety
/// - `store` must be a valid pointer returned by `rx_store_new`
/// - Returns null if row or col is out of bounds
/// - Caller must free the returned string with `rx_free_string`
#[no_mangle]
pub unsafe extern "C" fn rx_view_cell(store: *const FfiStore, row: usize, col: usize) -> *mut c_char {
    if store.is_null() {
        return ptr::null_mut();
    }

    let Some(column) = Column::from_index(col) else {
        return ptr::null_mut();
    };

    (&(*store).view)
        .get(row)
        .map(|record| to_c_string(column.value(record)))
        .unwrap_or(ptr::null_mut())
}

/// Get the whole view as a JSON array
///
/// # Safety
/// - `store` must be a valid pointer returned by `rx_store_new`
/// - Caller must free the returned string with `rx_free_string`
#[no_mangle]
pub unsafe extern "C" fn rx_view_json(store: *const FfiStore) -> *mut c_char {
    if store.is_null() {
        return ptr::null_mut();
    }

    match serde_json::to_string(&(*store).view) {
        Ok(json) => to_c_string(&json),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by an rx_* function or null
#[no_mangle]
pub unsafe extern "C" fn rx_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
