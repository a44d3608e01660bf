// kernel/src/arch/vector.rs
//
// 役割:
// - 例外ベクタテーブルを ROM(元の VTOR 位置) から RAM 上の専用領域へコピーし、VTOR を付け替える。
//
// やること:
// - VTOR を読んで元テーブルの番地を得る（呼び出し側が公開する）
// - N ワードを index 順にコピー
// - VTOR を RAM テーブルの番地に書き換える
//
// やらないこと:
// - 元テーブルへの書き込み（フラッシュ上にあるので書かない）
// - 個別ハンドラの差し替え（カーネル本体の責務）
//
// 設計方針:
// - RAM テーブルは「ロード後に動かない」静的領域へ固定配置する。
// - 容量とアラインメントはコンパイル時に検査する（実行時のエラー経路は持たない）。
//   VTOR はテーブルサイズ以上の 2 の冪境界を要求するので、256 ではなく 512 に揃える。

use core::cell::UnsafeCell;

use static_assertions::const_assert;

use crate::arch::bus::WordBus;
use crate::arch::scb::{Scb, Vtor};
use crate::config::VECTOR_COUNT;
use crate::types::{word_addr, Addr, Word};

/// `#[repr(align(N))]` は static ではなく “型” に付ける必要があるため、ラッパ型で表現する。
#[repr(C, align(512))]
pub struct RuntimeVectorTable(UnsafeCell<[Word; VECTOR_COUNT]>);

// Safety: 書き込むのは起動シーケンス（単一コア・割込みマスク中）の relocate だけ。
// それ以降は VTOR 経由でハードウェアが読むのみ。
unsafe impl Sync for RuntimeVectorTable {}

impl RuntimeVectorTable {
    pub const CAPACITY: usize = VECTOR_COUNT;
    pub const ALIGN: usize = 512;

    pub const fn new() -> Self {
        RuntimeVectorTable(UnsafeCell::new([0; VECTOR_COUNT]))
    }

    pub fn as_ptr(&self) -> *const Word {
        self.0.get() as *const Word
    }

    /// index 番目のハンドラ値を読む（範囲外は None）
    pub fn entry(&self, index: usize) -> Option<Word> {
        if index >= Self::CAPACITY {
            return None;
        }
        // Safety: 範囲内。再配置後は書き込みが無いので読み出しは競合しない
        Some(unsafe { core::ptr::read_volatile(self.as_ptr().add(index)) })
    }
}

const_assert!(RuntimeVectorTable::CAPACITY >= VECTOR_COUNT);
const_assert!(RuntimeVectorTable::ALIGN >= 256);
const_assert!(RuntimeVectorTable::ALIGN >= (VECTOR_COUNT * 4).next_power_of_two());
const_assert!(core::mem::align_of::<RuntimeVectorTable>() == RuntimeVectorTable::ALIGN);

/// RAM 上の実行時ベクタテーブル
#[cfg_attr(target_os = "none", link_section = ".bss.exctbl")]
pub static RUNTIME_VECTOR_TABLE: RuntimeVectorTable = RuntimeVectorTable::new();

/// 再配置の結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relocation {
    /// 再配置前に VTOR が指していた番地
    pub origin: Addr,
    /// 再配置後に VTOR が指す番地
    pub runtime: Addr,
}

/// ベクタテーブルを runtime へコピーして VTOR を付け替える。
///
/// - runtime は count ワード以上の書き込み可能領域であること（容量はビルド時に保証）
/// - 割込みは Interrupt Gate でマスク済みであること
pub fn relocate<B: WordBus + ?Sized>(bus: &mut B, runtime: Addr, count: usize) -> Relocation {
    let origin = Scb::new(bus).read::<Vtor>();

    for i in 0..count as u32 {
        let w = bus.read_word(word_addr(origin, i));
        bus.write_word(word_addr(runtime, i), w);
    }

    Scb::new(bus).write::<Vtor>(runtime);

    Relocation { origin, runtime }
}
