// kernel/src/mem/region.rs
//
// 役割:
// - カーネル内アロケータに渡すメモリ領域 (top, limit) を決める。
//
// やること:
// - static モード: 静的バッファ [base, base + size)
// - 計算モード: RAM 範囲・カーネル管理領域・イメージ終端・例外スタック予約から算出
// - 構成値の整合性検査（const fn なのでコンパイル時に評価できる）
//
// やらないこと:
// - 領域の分割・管理（それは後段のアロケータの責務）
// - 実行時の top <= limit 検査（ビルド/リンク時の不変条件として扱う）
//
// 計算モードの規則:
//   top   = max(RAM 先頭, 管理領域先頭, イメージ終端)
//   limit = 管理領域終端 - 例外スタック   (管理領域終端が設定済みで RAM 終端より下)
//         = RAM 終端     - 例外スタック   (それ以外)

use core::cell::UnsafeCell;
use core::fmt;

use crate::types::{Addr, MemoryRegion, Word};

/// 計算モードの入力となるビルド時構成
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryLayout {
    pub ram_start: Addr,
    pub ram_end: Addr,
    pub sysarea_top: Option<Addr>,
    pub sysarea_end: Option<Addr>,
    pub exc_stack_size: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// ram_start >= ram_end
    EmptyRam,
    /// 例外スタック予約が RAM より大きい
    ExcStackTooLarge,
    /// 管理領域先頭が RAM の外
    SysAreaTopOutsideRam,
    /// 管理領域終端が RAM 先頭以下、または例外スタック予約を引けない
    SysAreaEndOutsideRam,
    /// 例外スタックを引いた後に領域が残らない
    SysAreaExhausted,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::EmptyRam => write!(f, "internal RAM range is empty"),
            LayoutError::ExcStackTooLarge => write!(f, "exception stack reserve exceeds internal RAM"),
            LayoutError::SysAreaTopOutsideRam => write!(f, "system area top lies outside internal RAM"),
            LayoutError::SysAreaEndOutsideRam => write!(f, "system area end lies outside internal RAM"),
            LayoutError::SysAreaExhausted => write!(f, "no memory left below the exception stack reserve"),
        }
    }
}

impl MemoryLayout {
    /// 構成値が矛盾していないかを検査する。
    ///
    /// config 側で `const_assert!` に渡すため const fn に保つ。
    /// イメージ終端はリンク時にしか決まらないのでここでは見ない。
    pub const fn validate(&self) -> Result<(), LayoutError> {
        if self.ram_start >= self.ram_end {
            return Err(LayoutError::EmptyRam);
        }
        if self.exc_stack_size > self.ram_end - self.ram_start {
            return Err(LayoutError::ExcStackTooLarge);
        }
        if let Some(top) = self.sysarea_top {
            if top >= self.ram_end {
                return Err(LayoutError::SysAreaTopOutsideRam);
            }
        }
        if let Some(end) = self.sysarea_end {
            if end <= self.ram_start || end < self.exc_stack_size {
                return Err(LayoutError::SysAreaEndOutsideRam);
            }
        }
        if self.limit() <= self.floor() {
            return Err(LayoutError::SysAreaExhausted);
        }
        Ok(())
    }

    /// イメージ終端を考慮する前の下限 = max(RAM 先頭, 管理領域先頭)
    pub const fn floor(&self) -> Addr {
        match self.sysarea_top {
            Some(top) if top > self.ram_start => top,
            _ => self.ram_start,
        }
    }

    pub const fn top(&self, image_end: Addr) -> Addr {
        let floor = self.floor();
        if floor < image_end {
            image_end
        } else {
            floor
        }
    }

    pub const fn limit(&self) -> Addr {
        match self.sysarea_end {
            Some(end) if self.ram_end > end => end - self.exc_stack_size,
            _ => self.ram_end - self.exc_stack_size,
        }
    }
}

/// 領域の決め方（ビルド構成で一方を選ぶ）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemMemory {
    /// 静的バッファ
    Static { base: Addr, size: u32 },
    /// RAM 範囲から計算
    Computed(MemoryLayout),
}

impl SystemMemory {
    /// 領域を確定させる。image_end はリンカが置く `end` シンボルの番地。
    pub fn region(&self, image_end: Addr) -> MemoryRegion {
        match *self {
            SystemMemory::Static { base, size } => MemoryRegion::new(base, base + size),
            SystemMemory::Computed(layout) => {
                MemoryRegion::new(layout.top(image_end), layout.limit())
            }
        }
    }
}

/// static_sys_mem 用の静的バッファ。
///
/// 中身は起動シーケンスからは触らない（番地と長さだけを使う）。
#[repr(C, align(8))]
pub struct StaticSystemMemory<const N: usize>(UnsafeCell<[Word; N]>);

// Safety: 起動シーケンスは番地を取るだけで中身を読まない。
// 中身を使うのは引き渡し後の単一のアロケータのみ。
unsafe impl<const N: usize> Sync for StaticSystemMemory<N> {}

impl<const N: usize> StaticSystemMemory<N> {
    pub const SIZE: u32 = (N * core::mem::size_of::<Word>()) as u32;

    pub const fn new() -> Self {
        StaticSystemMemory(UnsafeCell::new([0; N]))
    }

    pub fn as_ptr(&self) -> *const Word {
        self.0.get() as *const Word
    }
}

#[cfg(feature = "static_sys_mem")]
#[cfg_attr(target_os = "none", link_section = ".bss.sysmem")]
pub static SYSTEM_MEM: StaticSystemMemory<{ crate::config::SYSTEM_MEM_WORDS }> =
    StaticSystemMemory::new();
