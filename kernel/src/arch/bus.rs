// kernel/src/arch/bus.rs
//
// 役割:
// - メモリとメモリマップドレジスタへの「ワード単位アクセス」を 1 つの trait にまとめる。
//
// やること:
// - WordBus: read_word / write_word
// - VolatileBus: 実機用。volatile アクセスでそのまま番地を読む/書く
//
// やらないこと:
// - レジスタごとの意味付け（それは scb.rs の型付きレジスタ側）
//
// 設計方針:
// - 起動シーケンスの順序ロジックは WordBus にしか依存しない。
//   テストではメモリとレジスタを模擬した SimBus に差し替える。
// - unsafe は VolatileBus の生成に寄せる（生成できる = 全番地に触ってよい、という権限）

use volatile::Volatile;

use crate::types::{Addr, Word};

pub trait WordBus {
    fn read_word(&self, addr: Addr) -> Word;
    fn write_word(&mut self, addr: Addr, value: Word);
}

impl<T: WordBus + ?Sized> WordBus for &mut T {
    #[inline(always)]
    fn read_word(&self, addr: Addr) -> Word {
        (**self).read_word(addr)
    }

    #[inline(always)]
    fn write_word(&mut self, addr: Addr, value: Word) {
        (**self).write_word(addr, value)
    }
}

/// 実機のバス
pub struct VolatileBus {
    _private: (),
}

impl VolatileBus {
    /// # Safety
    /// - 実機上でのみ使うこと（番地はそのままポインタとして解釈される）。
    /// - 同時に 2 つ以上作らないこと（単一コア・起動シーケンス専用）。
    pub const unsafe fn new() -> Self {
        VolatileBus { _private: () }
    }
}

impl WordBus for VolatileBus {
    #[inline(always)]
    fn read_word(&self, addr: Addr) -> Word {
        // Safety: VolatileBus::new の前提（実機上の有効な番地のみ渡される）
        let cell = unsafe { &*(addr as usize as *const Volatile<Word>) };
        cell.read()
    }

    #[inline(always)]
    fn write_word(&mut self, addr: Addr, value: Word) {
        // Safety: 同上
        let cell = unsafe { &mut *(addr as usize as *mut Volatile<Word>) };
        cell.write(value);
    }
}
