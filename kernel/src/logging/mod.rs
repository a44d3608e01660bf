// kernel/src/logging/mod.rs
//
// 行単位の最小ロガー。
// - info() / error(): 固定文字列を 1 行
// - info_kv(): key = 10 進数
// - info_hex(): key = 0x16 進数
//
// 出力先は set_sink() で登録された LogSink。未登録なら捨てる
// （起動直後は出力手段が保証されないため）。
//
// 重要:
// - SINK は static なので、section 初期化が終わるまでは一切呼ばない。
// - panic 経路は panic_report() のみを使う。ロックが取れなければ何も出さずに戻る
//   （ロック保持中の panic でスピンし続けないため）。
// - heap 無し。数値はスタック上のバッファで文字列化する。

#[cfg(all(feature = "itm_log", target_arch = "arm", target_os = "none"))]
mod itm;

use spin::Mutex;

pub trait LogSink: Sync {
    fn write_str(&self, s: &str);
}

static SINK: Mutex<Option<&'static dyn LogSink>> = Mutex::new(None);

/// ボード既定の出力先を登録する（itm_log 無しなら何もしない）
pub fn init() {
    #[cfg(all(feature = "itm_log", target_arch = "arm", target_os = "none"))]
    set_sink(&itm::ITM_SINK);
}

pub fn set_sink(sink: &'static dyn LogSink) {
    *SINK.lock() = Some(sink);
}

#[cfg(test)]
pub fn clear_sink() {
    *SINK.lock() = None;
}

pub fn info(msg: &str) {
    write_line("[INFO] ", &[msg]);
}

pub fn error(msg: &str) {
    write_line("[ERROR] ", &[msg]);
}

pub fn info_kv(key: &str, value: u64) {
    let mut buf = [0u8; 20];
    let s = u64_to_decimal(value, &mut buf);
    write_kv(key, s);
}

pub fn info_hex(key: &str, value: u64) {
    let mut buf = [0u8; 18];
    let s = u64_to_hex(value, &mut buf);
    write_kv(key, s);
}

fn write_kv(key: &str, value: &str) {
    if key.is_empty() {
        write_line("[INFO] ", &[value]);
        return;
    }
    write_line("[INFO] ", &[key, " = ", value]);
}

/// panic 位置を 1 行出す。SINK が使用中・未登録なら false。
pub fn panic_report(line: u32, col: u32) -> bool {
    let mut lbuf = [0u8; 20];
    let mut cbuf = [0u8; 20];
    let l = u64_to_decimal(line as u64, &mut lbuf);
    let c = u64_to_decimal(col as u64, &mut cbuf);

    let Some(guard) = SINK.try_lock() else {
        return false;
    };
    let Some(sink) = *guard else {
        return false;
    };
    emit(sink, "[PANIC] ", &["kernel-start panic line = ", l, " col = ", c]);
    true
}

/// 1 行分をロックを保持したまま書く（行が混ざらない）
fn write_line(prefix: &str, parts: &[&str]) {
    let guard = SINK.lock();
    let Some(sink) = *guard else {
        return;
    };
    emit(sink, prefix, parts);
}

fn emit(sink: &dyn LogSink, prefix: &str, parts: &[&str]) {
    sink.write_str(prefix);
    for p in parts {
        sink.write_str(p);
    }
    sink.write_str("\r\n");
}

fn u64_to_decimal(mut value: u64, buf: &mut [u8; 20]) -> &str {
    if value == 0 {
        let last = buf.len() - 1;
        buf[last] = b'0';
        return ascii_tail(buf, last);
    }

    let mut i = buf.len();
    while value > 0 {
        let digit = (value % 10) as u8;
        i -= 1;
        buf[i] = b'0' + digit;
        value /= 10;
    }

    ascii_tail(buf, i)
}

fn u64_to_hex(mut value: u64, buf: &mut [u8; 18]) -> &str {
    let mut i = buf.len();
    loop {
        let n = (value & 0xF) as u8;
        i -= 1;
        buf[i] = if n < 10 { b'0' + n } else { b'a' + (n - 10) };
        value >>= 4;
        if value == 0 {
            break;
        }
    }
    i -= 1;
    buf[i] = b'x';
    i -= 1;
    buf[i] = b'0';

    ascii_tail(buf, i)
}

fn ascii_tail(buf: &[u8], from: usize) -> &str {
    // Safety: 書き込んだのは ASCII の数字と 'x' のみ
    unsafe { core::str::from_utf8_unchecked(&buf[from..]) }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Capture(Mutex<String>);

    impl LogSink for Capture {
        fn write_str(&self, s: &str) {
            self.0.lock().push_str(s);
        }
    }

    static CAPTURE: Capture = Capture(Mutex::new(String::new()));

    #[test]
    fn decimal_formatting() {
        let mut buf = [0u8; 20];
        assert_eq!(u64_to_decimal(0, &mut buf), "0");
        let mut buf = [0u8; 20];
        assert_eq!(u64_to_decimal(120_000_000, &mut buf), "120000000");
        let mut buf = [0u8; 20];
        assert_eq!(u64_to_decimal(u64::MAX, &mut buf), "18446744073709551615");
    }

    #[test]
    fn hex_formatting() {
        let mut buf = [0u8; 18];
        assert_eq!(u64_to_hex(0, &mut buf), "0x0");
        let mut buf = [0u8; 18];
        assert_eq!(u64_to_hex(0x0800_0000, &mut buf), "0x8000000");
        let mut buf = [0u8; 18];
        assert_eq!(u64_to_hex(u64::MAX, &mut buf), "0xffffffffffffffff");
    }

    // SINK はプロセス全体で 1 つなので、登録を伴う確認はこの 1 本にまとめる
    #[test]
    fn lines_reach_the_registered_sink() {
        set_sink(&CAPTURE);
        info("boot: hello");
        info_kv("sysclk", 144_000_000);
        info_hex("vtor", 0x2000_0000);
        error("kernel entry returned");
        assert!(panic_report(42, 7));

        // 行の途中で panic した状況: ロック保持中でも待たずに諦める
        {
            let _held = SINK.lock();
            assert!(!panic_report(43, 1));
        }

        clear_sink();
        assert!(!panic_report(44, 1));
        info("dropped after clear");

        let out = CAPTURE.0.lock().clone();
        assert!(out.contains("[INFO] boot: hello\r\n"));
        assert!(out.contains("[INFO] sysclk = 144000000\r\n"));
        assert!(out.contains("[INFO] vtor = 0x20000000\r\n"));
        assert!(out.contains("[ERROR] kernel entry returned\r\n"));
        assert!(!out.contains("dropped after clear"));
        assert!(out.contains("[PANIC] kernel-start panic line = 42 col = 7\r\n"));
        assert!(!out.contains("line = 43"));
        assert!(!out.contains("line = 44"));
    }
}
