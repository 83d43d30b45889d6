use esp_idf_svc::sys;

/// Log heap usage statistics and current task stack headroom.
pub fn log_heap(label: &str) {
    let free_heap = unsafe { sys::esp_get_free_heap_size() };
    let min_free = unsafe { sys::esp_get_minimum_free_heap_size() };
    let largest_8bit = unsafe { sys::heap_caps_get_largest_free_block(sys::MALLOC_CAP_8BIT) };
    let stack_hwm_words = unsafe { sys::uxTaskGetStackHighWaterMark(core::ptr::null_mut()) };
    let stack_hwm_bytes = (stack_hwm_words as usize) * core::mem::size_of::<sys::StackType_t>();
    log::info!(
        "[MEM] {}: free={} min_free={} largest_8bit={} stack_hwm={}B",
        label,
        free_heap,
        min_free,
        largest_8bit,
        stack_hwm_bytes
    );
}

/// Why this boot happened; a button wake reads as `ext0`.
pub fn log_wakeup_cause() {
    let cause = unsafe { sys::esp_sleep_get_wakeup_cause() };
    let label = match cause {
        sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_EXT0 => "ext0",
        sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_UNDEFINED => "power-on",
        _ => "other",
    };
    log::info!("Wakeup cause: {} ({})", label, cause);
}
