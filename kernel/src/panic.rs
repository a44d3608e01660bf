// kernel/src/panic.rs
//
// no_std 実機用 panic ハンドラ。
// - 挙動は「割込み禁止 → 1 行出力（出せる時だけ） → CPU 停止」に固定する。
// - 出力は logging::panic_report のみ。SINK のロックが取れない（= 出力中に panic した）
//   場合は何も出さずに停止する。ロック待ちで止まらない。
// - 二重 panic は即停止
// - message の文字列化は行わない（fmt を引き込まない）。
// - section 初期化前の panic では SINK 未登録なので、何も出ずに止まる。

use core::panic::PanicInfo;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::{arch, logging};

static PANIC_IN_PROGRESS: AtomicBool = AtomicBool::new(false);

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    cortex_m::interrupt::disable();

    if PANIC_IN_PROGRESS.swap(true, Ordering::AcqRel) {
        return arch::halt_loop();
    }

    let (line, col) = match info.location() {
        Some(loc) => (loc.line(), loc.column()),
        None => (0, 0),
    };
    let _ = logging::panic_report(line, col);

    arch::halt_loop()
}
