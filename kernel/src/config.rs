// kernel/src/config.rs
//
// 役割:
// - ビルド時に固定される構成値（RAM 範囲、例外スタック、ベクタ数、例外優先度）を 1 箇所に集約する。
//
// やること:
// - 定数の定義と、その組み合わせが矛盾しないことのコンパイル時検査。
//
// やらないこと:
// - 実行時の構成変更（起動後に変わる値はここに置かない）
//
// 想定ボード: XMC4700 (Cortex-M4F, 優先度 6bit 実装, 外部割込み 112 本)

use static_assertions::const_assert;

use crate::mem::region::MemoryLayout;
use crate::types::Addr;

// ─────────────────────────────────────────────
// メモリ
// ─────────────────────────────────────────────

/// 内蔵 RAM の先頭
pub const INTERNAL_RAM_START: Addr = 0x2000_0000;
/// 内蔵 RAM の終端（この番地は含まない）
pub const INTERNAL_RAM_END: Addr = 0x2004_0000;

/// カーネル管理領域の先頭（未設定なら None）
pub const SYSTEMAREA_TOP: Option<Addr> = None;
/// カーネル管理領域の終端（未設定なら None）
pub const SYSTEMAREA_END: Option<Addr> = None;

/// RAM 上端に確保する例外スタックのサイズ
pub const EXC_STACK_SIZE: u32 = 0x400;

/// static_sys_mem 時に静的確保するカーネル用メモリのサイズ
pub const SYSTEM_MEM_SIZE: u32 = 0x8000;
pub const SYSTEM_MEM_WORDS: usize = (SYSTEM_MEM_SIZE / 4) as usize;

pub const MEMORY_LAYOUT: MemoryLayout = MemoryLayout {
    ram_start: INTERNAL_RAM_START,
    ram_end: INTERNAL_RAM_END,
    sysarea_top: SYSTEMAREA_TOP,
    sysarea_end: SYSTEMAREA_END,
    exc_stack_size: EXC_STACK_SIZE,
};

// ─────────────────────────────────────────────
// ベクタテーブル
// ─────────────────────────────────────────────

/// システム例外の数（Reset 等を含む 0..15）
pub const N_SYSVEC: usize = 16;
/// 外部割込みライン数
pub const CORE_EXT_INTVEC: usize = 112;
/// ソフトウェア割込みライン数（XMC4700 では使わない）
pub const CORE_SOFT_INTVEC: usize = 0;

/// RAM にコピーするベクタの総数
pub const VECTOR_COUNT: usize = N_SYSVEC + CORE_EXT_INTVEC + CORE_SOFT_INTVEC;

// ─────────────────────────────────────────────
// 例外優先度
// ─────────────────────────────────────────────

/// 優先度値に使うビット数（8bit フィールドの上位から使われる）
/// XMC4700 の実装は 6bit だが上位 3bit だけを使う。論理優先度は 0..=7 で、
/// 4:4 分割でも値ごとに group が分かれる。
pub const INTPRI_BITS: u32 = 3;

/// 論理優先度の最大値（最低優先度）
pub const INTPRI_LOWEST: u8 = ((1u32 << INTPRI_BITS) - 1) as u8;

/// AIRCR.PRIGROUP: group[7:4] / sub[3:0] の 4:4 分割
pub const PRIGROUP_4_4: u32 = 3;

pub const INTPRI_SVC: u8 = 0;
pub const INTPRI_SYSTICK: u8 = 1;
/// PendSV は常に最低優先度
pub const INTPRI_PENDSV: u8 = INTPRI_LOWEST;

/// 割込み禁止時に BASEPRI へ入れる閾値（これ以上の値の割込みはマスク）
pub const INTPRI_MAX_EXTINT_PRI: u8 = 1;

/// 論理優先度を 8bit 優先度フィールドの上位 INTPRI_BITS に詰める
#[inline(always)]
pub const fn intpri_val(pri: u8) -> u8 {
    pri << (8 - INTPRI_BITS)
}

/// 8bit 優先度フィールドのうち、プリエンプションを決める group 部分 (PRIGROUP=3 のとき [7:4])
#[inline(always)]
pub const fn group_of(field: u8) -> u8 {
    field >> (PRIGROUP_4_4 + 1)
}

/// 8bit 優先度フィールドから論理優先度を取り出す
#[inline(always)]
pub const fn intpri_of(field: u8) -> u8 {
    field >> (8 - INTPRI_BITS)
}

const_assert!(MEMORY_LAYOUT.validate().is_ok());
const_assert!(SYSTEM_MEM_SIZE % 4 == 0);

const_assert!(VECTOR_COUNT > N_SYSVEC);

const_assert!(INTPRI_BITS >= 3 && INTPRI_BITS <= 8);
const_assert!(INTPRI_PENDSV as u32 == (1u32 << INTPRI_BITS) - 1);
const_assert!(INTPRI_PENDSV == 7);
const_assert!(INTPRI_SVC < INTPRI_SYSTICK && INTPRI_SYSTICK < INTPRI_PENDSV);
const_assert!(INTPRI_MAX_EXTINT_PRI > INTPRI_SVC);
// group が異なるときだけ SVC -> SysTick -> PendSV のプリエンプションが成り立つ
const_assert!(INTPRI_BITS <= 8 - (PRIGROUP_4_4 + 1));
const_assert!(group_of(intpri_val(INTPRI_SVC)) < group_of(intpri_val(INTPRI_SYSTICK)));
const_assert!(group_of(intpri_val(INTPRI_SYSTICK)) < group_of(intpri_val(INTPRI_PENDSV)));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_values_live_in_the_implemented_high_bits() {
        assert_eq!(intpri_val(0), 0x00);
        assert_eq!(intpri_val(1), 0x20);
        assert_eq!(intpri_val(7), 0xe0);
        assert_eq!(intpri_of(intpri_val(INTPRI_PENDSV)), INTPRI_PENDSV);
    }

    #[test]
    fn each_system_exception_gets_its_own_group() {
        assert_eq!(group_of(intpri_val(INTPRI_SVC)), 0);
        assert_eq!(group_of(intpri_val(INTPRI_SYSTICK)), 2);
        assert_eq!(group_of(intpri_val(INTPRI_PENDSV)), 14);
    }

    #[test]
    fn pendsv_is_the_lowest_encodable_priority() {
        let max_logical = ((1u32 << INTPRI_BITS) - 1) as u8;
        assert_eq!(INTPRI_PENDSV, max_logical);
        assert_eq!(intpri_val(INTPRI_PENDSV), 0xe0);
        // 論理優先度で表せるどの値も PendSV より group が小さいか等しい
        for p in 0..=max_logical {
            assert!(group_of(intpri_val(p)) <= group_of(intpri_val(INTPRI_PENDSV)));
        }
    }

    #[test]
    fn vector_count_matches_board() {
        assert_eq!(VECTOR_COUNT, 128);
    }

    #[test]
    fn configured_layout_is_valid() {
        assert_eq!(MEMORY_LAYOUT.validate(), Ok(()));
    }
}
