// kernel/src/lib.rs
//
// kernel-start: ARMv7-M 単一コア MCU のリセット後起動シーケンス
//
// 役割:
// - リセットハンドラの直後からカーネル本体 (kernel_main) に入るまでの準備を行う
//
// 構成:
// - arch   : バス / SCB レジスタ / CPU / 割込みゲート / ベクタ再配置 / 優先度
// - mem    : section 初期化、カーネル用メモリ領域
// - boot   : 起動シーケンス本体と引き渡し状態
// - config : ビルド時定数（検査もここ）
// - logging: 行単位ロガー
//
// ホストでは std 付きでビルドし、ハードウェアは testing の模擬に差し替えてテストする。

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod boot;
pub mod config;
pub mod logging;
pub mod mem;
pub mod types;

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod panic;

#[cfg(test)]
mod testing;

#[cfg(feature = "debug_sysmeminfo")]
pub use boot::state::debug_sysmem_info;
pub use boot::state::{low_memory, origin_vector_table, runtime_vector_table, system_clock_hz};
pub use types::MemoryRegion;
