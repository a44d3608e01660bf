// kernel/src/boot/state.rs
//
// 役割:
// - 起動シーケンスが後段へ引き渡す状態（元ベクタテーブル番地、メモリ領域、システムクロック）を保持する。
//
// やること:
// - 各値を「一度だけ書ける」セル (spin::Once) に入れ、読み出し専用のアクセサで公開する。
// - 起動シーケンスを 1 回だけ実行する権利 (BootToken) を払い出す。
//
// やらないこと:
// - 値の更新・破棄（書き手は起動シーケンスのみ、プロセスは終了しない）
//
// 設計上の不変条件:
// - BootState の書き込みは section 初期化の後にしか起きない（static は .bss/.data 上にあるため）。
// - BootToken は Clone/Copy を持たないので、1 つのトークンで 2 回起動はできない。

use core::sync::atomic::{AtomicBool, Ordering};

use spin::Once;

use crate::arch::vector::{RuntimeVectorTable, RUNTIME_VECTOR_TABLE};
use crate::types::{Addr, MemoryRegion};

/// 起動シーケンスを 1 回だけ実行する権利
#[derive(Debug)]
pub struct BootToken {
    _private: (),
}

impl BootToken {
    /// リセット直後の入口でトークンを作る。
    ///
    /// # Safety
    /// - リセットから起動シーケンス完了までの間に 1 回だけ呼ぶこと。
    /// - この時点では static が未初期化なので、BootState::claim は使えない。
    pub unsafe fn steal() -> Self {
        BootToken { _private: () }
    }
}

pub struct BootState {
    claimed: AtomicBool,
    origin_vector_table: Once<Addr>,
    system_clock_hz: Once<u32>,
    low_memory: Once<MemoryRegion>,
    #[cfg(feature = "debug_sysmeminfo")]
    sysmem_info: Once<MemoryRegion>,
}

impl BootState {
    pub const fn new() -> Self {
        BootState {
            claimed: AtomicBool::new(false),
            origin_vector_table: Once::new(),
            system_clock_hz: Once::new(),
            low_memory: Once::new(),
            #[cfg(feature = "debug_sysmeminfo")]
            sysmem_info: Once::new(),
        }
    }

    /// この BootState に対する起動権を 1 度だけ払い出す。2 回目以降は None。
    pub fn claim(&self) -> Option<BootToken> {
        if self.claimed.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(BootToken { _private: () })
    }

    pub(crate) fn publish_origin_vector_table(&self, addr: Addr) {
        self.origin_vector_table.call_once(|| addr);
    }

    pub(crate) fn publish_system_clock(&self, hz: u32) {
        self.system_clock_hz.call_once(|| hz);
    }

    pub(crate) fn publish_low_memory(&self, region: MemoryRegion) {
        self.low_memory.call_once(|| region);
        #[cfg(feature = "debug_sysmeminfo")]
        self.sysmem_info.call_once(|| region);
    }

    /// 再配置前に VTOR が指していた番地
    pub fn origin_vector_table(&self) -> Option<Addr> {
        self.origin_vector_table.get().copied()
    }

    pub fn system_clock_hz(&self) -> Option<u32> {
        self.system_clock_hz.get().copied()
    }

    /// カーネル内アロケータ用の領域（imalloc 無効時は常に None）
    pub fn low_memory(&self) -> Option<MemoryRegion> {
        self.low_memory.get().copied()
    }

    #[cfg(feature = "debug_sysmeminfo")]
    pub fn debug_sysmem_info(&self) -> Option<MemoryRegion> {
        self.sysmem_info.get().copied()
    }
}

/// プロセス全体で 1 つの引き渡し状態
pub static BOOT_STATE: BootState = BootState::new();

pub fn origin_vector_table() -> Option<Addr> {
    BOOT_STATE.origin_vector_table()
}

pub fn system_clock_hz() -> Option<u32> {
    BOOT_STATE.system_clock_hz()
}

pub fn low_memory() -> Option<MemoryRegion> {
    BOOT_STATE.low_memory()
}

#[cfg(feature = "debug_sysmeminfo")]
pub fn debug_sysmem_info() -> Option<MemoryRegion> {
    BOOT_STATE.debug_sysmem_info()
}

pub fn runtime_vector_table() -> &'static RuntimeVectorTable {
    &RUNTIME_VECTOR_TABLE
}
